// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{CompletionRequest, LlmResponse, ModelError};

/// Deterministic mock provider for tests. Echoes the last user message
/// back as the assistant response.
#[derive(Default, Debug)]
pub struct MockProvider;

#[async_trait]
impl crate::Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }
    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, req: CompletionRequest) -> Result<LlmResponse, ModelError> {
        let reply = req.last_user_text().unwrap_or("[no input]").to_string();
        Ok(LlmResponse {
            content: format!("MOCK: {reply}"),
            prompt_tokens: Some(10),
            completion_tokens: Some(10),
            total_tokens: Some(20),
            model_used: "mock-model".to_string(),
        })
    }
}

/// One pre-scripted outcome for a [`RecordingProvider`] call.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Succeed with this assistant text.
    Text(String),
    /// Fail with a context-overflow error.
    ContextLength,
    /// Fail with a generic API error carrying this status.
    ApiError(u16),
}

/// A pre-scripted provider that records every request it sees.
///
/// Each `complete` call pops the next script entry; tests inspect
/// `requests` afterwards to assert on exactly what was sent. When the
/// scripts run out it falls back to echoing, so over-calling is visible
/// in assertions rather than a panic.
///
/// Clones share the script queue and the request log, so a provider
/// factory in a test can hand out per-model clones while the test keeps
/// one view of everything that happened.
#[derive(Clone, Debug)]
pub struct RecordingProvider {
    model: String,
    scripts: Arc<Mutex<Vec<Scripted>>>,
    /// Every `CompletionRequest` seen, in call order.
    pub requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl RecordingProvider {
    pub fn new(model: impl Into<String>, scripts: Vec<Scripted>) -> Self {
        Self {
            model: model.into(),
            scripts: Arc::new(Mutex::new(scripts)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Convenience: provider that always answers with fixed text.
    pub fn always_text(model: impl Into<String>, reply: impl Into<String>) -> Self {
        Self::new(model, vec![Scripted::Text(reply.into())])
    }

    /// A clone of this provider reporting a different model id.
    pub fn with_model(&self, model: impl Into<String>) -> Self {
        let mut clone = self.clone();
        clone.model = model.into();
        clone
    }

    fn respond(&self, script: Scripted) -> Result<LlmResponse, ModelError> {
        match script {
            Scripted::Text(content) => Ok(LlmResponse {
                content,
                prompt_tokens: Some(7),
                completion_tokens: Some(3),
                total_tokens: Some(10),
                model_used: self.model.clone(),
            }),
            Scripted::ContextLength => Err(ModelError::ContextLength {
                provider: "recording-mock".into(),
                message: "maximum context length exceeded".into(),
            }),
            Scripted::ApiError(status) => Err(ModelError::Api {
                provider: "recording-mock".into(),
                status,
                message: "scripted failure".into(),
            }),
        }
    }
}

#[async_trait]
impl crate::Provider for RecordingProvider {
    fn name(&self) -> &str {
        "recording-mock"
    }
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, req: CompletionRequest) -> Result<LlmResponse, ModelError> {
        self.requests.lock().unwrap().push(req.clone());
        let script = {
            let mut scripts = self.scripts.lock().unwrap();
            if scripts.is_empty() {
                Scripted::Text("[no more scripts]".into())
            } else {
                scripts.remove(0)
            }
        };
        self.respond(script)
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Shared implementation for OpenAI-compatible chat completion APIs.
//!
//! Sherlock, OpenAI, and OpenWebUI all speak the same `/chat/completions`
//! wire format; this module provides a single `ChatCompletionsProvider`
//! that each backend configures with its own endpoint. Requests are
//! non-streaming: one POST, one JSON body back.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::{CompletionRequest, LlmResponse, ModelError};

#[derive(Debug)]
pub struct ChatCompletionsProvider {
    /// Provider id returned by `Provider::name()`.
    provider_id: &'static str,
    /// Model id forwarded to the API.
    model: String,
    /// API key, pre-resolved from config or env.
    api_key: String,
    /// Full chat completions URL.
    chat_url: String,
    /// Per-request timeout.
    timeout: Duration,
    client: reqwest::Client,
}

impl ChatCompletionsProvider {
    /// Construct a provider from a full chat completions URL.
    ///
    /// `chat_url` must be the complete endpoint. The three backends differ
    /// in how the path is derived from their base (`/v1/chat/completions`
    /// vs `/api/chat/completions`), so the factory resolves it up front.
    pub fn new(
        provider_id: &'static str,
        model: String,
        api_key: String,
        chat_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            provider_id,
            model,
            api_key,
            chat_url: chat_url.into(),
            timeout,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl crate::Provider for ChatCompletionsProvider {
    fn name(&self) -> &str {
        self.provider_id
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, req: CompletionRequest) -> Result<LlmResponse, ModelError> {
        let body = json!({
            "model": self.model,
            "messages": &req.messages,
        });

        debug!(
            provider = %self.provider_id,
            model = %self.model,
            message_count = req.messages.len(),
            "sending completion request"
        );

        let resp = self
            .client
            .post(&self.chat_url)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Network {
                provider: self.provider_id.to_string(),
                source: e,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ModelError::from_http(self.provider_id, status.as_u16(), text));
        }

        let v: Value = resp.json().await.map_err(|e| ModelError::Malformed {
            provider: self.provider_id.to_string(),
            message: format!("invalid JSON: {e}"),
        })?;

        parse_chat_response(self.provider_id, &self.model, &v)
    }
}

/// Extract `choices[0].message.content` and the optional usage block.
fn parse_chat_response(
    provider_id: &str,
    model: &str,
    v: &Value,
) -> Result<LlmResponse, ModelError> {
    let content = v["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| ModelError::Malformed {
            provider: provider_id.to_string(),
            message: "missing choices[0].message.content".into(),
        })?
        .to_string();

    let usage = &v["usage"];
    let token = |key: &str| usage[key].as_u64().map(|n| n as u32);

    Ok(LlmResponse {
        content,
        prompt_tokens: token("prompt_tokens"),
        completion_tokens: token("completion_tokens"),
        total_tokens: token("total_tokens"),
        // Some gateways substitute the model; prefer what the API reports.
        model_used: v["model"].as_str().unwrap_or(model).to_string(),
    })
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

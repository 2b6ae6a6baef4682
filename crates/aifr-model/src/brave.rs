// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Brave summarizer backend.
//!
//! Unlike the chat backends this is a GET endpoint that takes a single
//! query string. The composed conversation is collapsed to the last user
//! message with the envelope markers stripped; prior turns are not sent.
//! Stateless per call: multi-turn memory does not survive the collapse.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::{envelope, CompletionRequest, LlmResponse, ModelError};

const PROVIDER_ID: &str = "brave";

#[derive(Debug)]
pub struct BraveProvider {
    api_key: String,
    /// Full summarizer search URL.
    endpoint: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl BraveProvider {
    pub fn new(api_key: String, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            api_key,
            endpoint: endpoint.into(),
            timeout,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl crate::Provider for BraveProvider {
    fn name(&self) -> &str {
        PROVIDER_ID
    }

    fn model(&self) -> &str {
        "brave-summarizer"
    }

    async fn complete(&self, req: CompletionRequest) -> Result<LlmResponse, ModelError> {
        let query = req
            .last_user_text()
            .map(envelope::strip_envelopes)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| ModelError::Malformed {
                provider: PROVIDER_ID.to_string(),
                message: "no user message to summarize".into(),
            })?;

        debug!(query_len = query.len(), "sending summarizer query");

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query.as_str())])
            .header("X-Subscription-Token", &self.api_key)
            .header("Accept", "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ModelError::Network {
                provider: PROVIDER_ID.to_string(),
                source: e,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ModelError::from_http(PROVIDER_ID, status.as_u16(), text));
        }

        let v: Value = resp.json().await.map_err(|e| ModelError::Malformed {
            provider: PROVIDER_ID.to_string(),
            message: format!("invalid JSON: {e}"),
        })?;

        let content = extract_summary(&v).ok_or_else(|| ModelError::Malformed {
            provider: PROVIDER_ID.to_string(),
            message: "response has no summary".into(),
        })?;

        // The summarizer reports no usage block; token fields stay empty.
        Ok(LlmResponse {
            content,
            prompt_tokens: None,
            completion_tokens: None,
            total_tokens: None,
            model_used: "brave-summarizer".to_string(),
        })
    }
}

/// Pull the summary text out of the response.
///
/// The summarizer returns `summary` as an array of typed token objects
/// (`{"type": "token", "data": "…"}`); older responses carry a plain
/// string. Accept both.
fn extract_summary(v: &Value) -> Option<String> {
    match &v["summary"] {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(parts) => {
            let text: String = parts
                .iter()
                .filter_map(|p| p["data"].as_str())
                .collect::<Vec<_>>()
                .join("");
            (!text.is_empty()).then_some(text)
        }
        _ => None,
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_plain_string_summary() {
        let v: Value = serde_json::from_str(r#"{"summary": "short answer"}"#).unwrap();
        assert_eq!(extract_summary(&v).as_deref(), Some("short answer"));
    }

    #[test]
    fn extract_token_array_summary() {
        let v: Value = serde_json::from_str(
            r#"{"summary": [
                {"type": "token", "data": "two "},
                {"type": "token", "data": "parts"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(extract_summary(&v).as_deref(), Some("two parts"));
    }

    #[test]
    fn extract_rejects_empty_summary() {
        let v: Value = serde_json::from_str(r#"{"summary": []}"#).unwrap();
        assert_eq!(extract_summary(&v), None);
        let v: Value = serde_json::from_str(r#"{"status": "pending"}"#).unwrap();
        assert_eq!(extract_summary(&v), None);
    }
}

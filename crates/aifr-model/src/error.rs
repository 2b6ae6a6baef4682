// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Typed provider errors.
//!
//! Context-overflow responses get their own variant so the orchestrator can
//! retry once on a larger-window model; everything else surfaces as-is.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    /// The provider rejected the request because the composed conversation
    /// exceeds the model's context window.
    #[error("{provider}: context window exceeded: {message}")]
    ContextLength { provider: String, message: String },

    /// Non-2xx HTTP response that is not a context-overflow signal.
    #[error("{provider}: HTTP {status}: {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    /// Transport-level failure (DNS, TLS, timeout, connection reset).
    #[error("{provider}: request failed: {source}")]
    Network {
        provider: String,
        #[source]
        source: reqwest::Error,
    },

    /// 2xx response whose body does not match the expected shape.
    #[error("{provider}: unexpected response shape: {message}")]
    Malformed { provider: String, message: String },

    /// Provider cannot be constructed from the given configuration.
    /// Raised before any remote I/O.
    #[error("{0}")]
    Config(String),
}

impl ModelError {
    pub fn is_context_length(&self) -> bool {
        matches!(self, ModelError::ContextLength { .. })
    }

    /// Normalize a non-2xx HTTP response into either `ContextLength` or
    /// `Api`, based on the overflow markers providers put in error bodies.
    pub fn from_http(provider: &str, status: u16, body: String) -> Self {
        if looks_like_context_overflow(&body) {
            ModelError::ContextLength {
                provider: provider.to_string(),
                message: truncate(&body, 300),
            }
        } else {
            ModelError::Api {
                provider: provider.to_string(),
                status,
                message: truncate(&body, 300),
            }
        }
    }
}

fn looks_like_context_overflow(body: &str) -> bool {
    let lower = body.to_ascii_lowercase();
    ["context length", "maximum context", "context_length_exceeded"]
        .iter()
        .any(|marker| lower.contains(marker))
}

/// Bound error-body text to keep stderr readable; error bodies from proxies
/// can be full HTML pages.
fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.trim().to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &s[..end].trim())
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_marker_maps_to_context_length() {
        let e = ModelError::from_http(
            "sherlock",
            400,
            r#"{"error":{"code":"context_length_exceeded"}}"#.into(),
        );
        assert!(e.is_context_length());
    }

    #[test]
    fn overflow_phrase_is_case_insensitive() {
        let e = ModelError::from_http("openai", 413, "Maximum CONTEXT length reached".into());
        assert!(e.is_context_length());
    }

    #[test]
    fn plain_400_maps_to_api_error() {
        let e = ModelError::from_http("openai", 400, "bad request".into());
        assert!(matches!(e, ModelError::Api { status: 400, .. }));
    }

    #[test]
    fn api_error_carries_provider_and_status() {
        let e = ModelError::from_http("openwebui", 502, "upstream died".into());
        let text = e.to_string();
        assert!(text.contains("openwebui"));
        assert!(text.contains("502"));
    }

    #[test]
    fn long_bodies_are_truncated() {
        let e = ModelError::from_http("openai", 500, "x".repeat(5000));
        assert!(e.to_string().len() < 500);
    }
}

// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

fn default_context_limit() -> usize {
    6000
}
fn default_request_timeout() -> u64 {
    120
}
fn default_command_timeout() -> u64 {
    30
}
fn default_file_timeout() -> u64 {
    10
}
fn default_max_turns() -> usize {
    5
}

/// Application configuration, read once at startup and immutable after.
///
/// Lives at `<config_dir>/aifr/config.json`. Unknown fields are ignored so
/// configs written for newer versions still load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend id: "sherlock" | "openai" | "openwebui" | "brave".
    /// When absent the provider is detected from which API-key environment
    /// variable is set.
    pub provider: Option<String>,
    /// Explicit API key; prefer the per-provider environment variable to
    /// keep secrets out of config files.
    pub api_key: Option<String>,
    /// Model used when neither `-m` nor keyword routing applies.
    pub model_default: Option<String>,
    /// Token budget for one composed conversation.
    #[serde(default = "default_context_limit")]
    pub context_limit: usize,
    /// Endpoint base. Required for openwebui; optional override for brave.
    pub base_url: Option<String>,
    /// Short names resolved before model selection, e.g.
    /// `{"fast": "Llama-3.1-8B-Instruct", "gpt": "openai/gpt-4o-mini"}`.
    pub model_aliases: HashMap<String, String>,
    /// User-defined agents selectable with `--agent <name>`.
    pub custom_agents: HashMap<String, CustomAgent>,
    /// HTTP timeout for one completion call, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Timeout for `-c` command capture, in seconds.
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
    /// Timeout for reading one attached file, in seconds.
    #[serde(default = "default_file_timeout")]
    pub file_timeout_secs: u64,
    /// Sliding-window size in user+assistant pairs.
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: None,
            api_key: None,
            model_default: None,
            context_limit: default_context_limit(),
            base_url: None,
            model_aliases: HashMap::new(),
            custom_agents: HashMap::new(),
            request_timeout_secs: default_request_timeout(),
            command_timeout_secs: default_command_timeout(),
            file_timeout_secs: default_file_timeout(),
            max_turns: default_max_turns(),
        }
    }
}

/// A user-defined agent: its system prompt and an optional pinned model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomAgent {
    pub system_prompt: String,
    /// When set, overrides keyword-based model selection for this agent.
    #[serde(default)]
    pub model: Option<String>,
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.context_limit, 6000);
        assert_eq!(cfg.request_timeout_secs, 120);
        assert_eq!(cfg.command_timeout_secs, 30);
        assert_eq!(cfg.max_turns, 5);
        assert!(cfg.provider.is_none());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let cfg: Config = serde_json::from_str(
            r#"{"provider": "openai", "future_knob": {"nested": true}}"#,
        )
        .unwrap();
        assert_eq!(cfg.provider.as_deref(), Some("openai"));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: Config = serde_json::from_str(r#"{"api_key": "k"}"#).unwrap();
        assert_eq!(cfg.context_limit, 6000);
        assert_eq!(cfg.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn custom_agents_parse_with_optional_model() {
        let cfg: Config = serde_json::from_str(
            r#"{"custom_agents": {
                "reviewer": {"system_prompt": "You review code.", "model": "gpt-4o-mini"},
                "plain": {"system_prompt": "Just answer."}
            }}"#,
        )
        .unwrap();
        assert_eq!(cfg.custom_agents["reviewer"].model.as_deref(), Some("gpt-4o-mini"));
        assert!(cfg.custom_agents["plain"].model.is_none());
    }
}

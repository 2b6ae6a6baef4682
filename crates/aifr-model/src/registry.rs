// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Provider registry: static metadata for every supported backend.
//!
//! Single source of truth for which provider ids exist and what their
//! defaults are. Construction logic lives in [`crate::from_config`].

/// Metadata describing a registered provider.
#[derive(Debug, Clone)]
pub struct ProviderMeta {
    /// Unique provider id used in the `provider` config field.
    pub id: &'static str,
    /// Human-readable display name.
    pub name: &'static str,
    /// One-line description shown by `aifr --list-models`.
    pub description: &'static str,
    /// Environment variable that holds the API key.
    pub api_key_env: &'static str,
    /// Chat endpoint, or `None` when the user must supply `base_url`.
    pub default_endpoint: Option<&'static str>,
    /// Whether `base_url` must be present in config.
    pub requires_base_url: bool,
}

/// Complete registry of supported providers.
pub static PROVIDERS: &[ProviderMeta] = &[
    ProviderMeta {
        id: "sherlock",
        name: "Sherlock",
        description: "CloudFerro Sherlock hosted open models",
        api_key_env: "SHERLOCK_API_KEY",
        default_endpoint: Some("https://api-sherlock.cloudferro.com/openai/v1/chat/completions"),
        requires_base_url: false,
    },
    ProviderMeta {
        id: "openai",
        name: "OpenAI",
        description: "OpenAI chat completions",
        api_key_env: "OPENAI_API_KEY",
        default_endpoint: Some("https://api.openai.com/v1/chat/completions"),
        requires_base_url: false,
    },
    ProviderMeta {
        id: "openwebui",
        name: "OpenWebUI",
        description: "Self-hosted OpenWebUI instance (set base_url)",
        api_key_env: "OPENWEBUI_API_KEY",
        default_endpoint: None,
        requires_base_url: true,
    },
    ProviderMeta {
        id: "brave",
        name: "Brave Summarizer",
        description: "Brave search summarizer (stateless, single query per call)",
        api_key_env: "BRAVE_API_KEY",
        default_endpoint: Some("https://api.search.brave.com/res/v1/summarizer/search"),
        requires_base_url: false,
    },
];

/// Look up a provider by id, case-insensitively. Returns `None` for unknown ids.
pub fn get_provider(id: &str) -> Option<&'static ProviderMeta> {
    PROVIDERS.iter().find(|p| p.id.eq_ignore_ascii_case(id))
}

/// Returns an iterator over all known provider ids.
pub fn known_provider_ids() -> impl Iterator<Item = &'static str> {
    PROVIDERS.iter().map(|p| p.id)
}

/// Pick a provider from the environment when config names none.
///
/// Checked in fixed priority order; falls back to sherlock so a bare
/// `SHERLOCK_API_KEY` setup needs no config file at all.
pub fn detect_provider_from_env() -> &'static str {
    for id in ["openai", "brave", "openwebui", "sherlock"] {
        let meta = get_provider(id).expect("registry covers detection order");
        if std::env::var(meta.api_key_env).is_ok_and(|v| !v.is_empty()) {
            return meta.id;
        }
    }
    "sherlock"
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_non_empty() {
        assert!(!PROVIDERS.is_empty());
    }

    #[test]
    fn all_ids_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for p in PROVIDERS {
            assert!(seen.insert(p.id), "duplicate provider id: {}", p.id);
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let p = get_provider("OpenWebUI").expect("openwebui must be registered");
        assert_eq!(p.id, "openwebui");
        assert!(p.requires_base_url);
    }

    #[test]
    fn lookup_returns_none_for_unknown() {
        assert!(get_provider("totally-unknown-provider-xyz").is_none());
    }

    #[test]
    fn known_ids_cover_all_four_backends() {
        let ids: Vec<&str> = known_provider_ids().collect();
        for required in &["sherlock", "openai", "openwebui", "brave"] {
            assert!(ids.contains(required), "missing provider: {required}");
        }
    }
}

// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Provider abstraction and the four concrete backends.
//!
//! The crate exposes:
//! - the conversation data model ([`Message`], [`Role`], [`LlmResponse`]),
//! - the envelope wire contract ([`envelope`]),
//! - the [`Provider`] trait with its typed [`ModelError`],
//! - a static [`registry`] of backends and a [`from_config`] factory,
//! - mock providers for tests.

use std::time::Duration;

pub mod brave;
pub mod catalog;
pub mod chat;
pub mod envelope;
pub mod error;
pub mod mock;
pub mod provider;
pub mod registry;
pub mod types;

pub use brave::BraveProvider;
pub use chat::ChatCompletionsProvider;
pub use error::ModelError;
pub use mock::{MockProvider, RecordingProvider, Scripted};
pub use provider::Provider;
pub use types::{CompletionRequest, LlmResponse, Message, Role};

/// Build a provider from config, a resolved provider id, and a model id.
///
/// Fails with [`ModelError::Config`], before any remote I/O, when the
/// provider is unknown, the API key cannot be resolved, or openwebui is
/// selected without a `base_url`.
pub fn from_config(
    config: &aifr_config::Config,
    provider_id: &str,
    model: &str,
) -> Result<Box<dyn Provider>, ModelError> {
    let meta = registry::get_provider(provider_id).ok_or_else(|| {
        ModelError::Config(format!(
            "unknown provider '{provider_id}' (expected one of: sherlock, openai, openwebui, brave)"
        ))
    })?;

    let api_key = resolve_api_key(config, meta)?;
    let timeout = Duration::from_secs(config.request_timeout_secs);

    match meta.id {
        "sherlock" | "openai" => {
            let endpoint = meta
                .default_endpoint
                .expect("chat backends carry a default endpoint");
            Ok(Box::new(ChatCompletionsProvider::new(
                meta.id,
                model.to_string(),
                api_key,
                endpoint,
                timeout,
            )))
        }
        "openwebui" => {
            let base = config
                .base_url
                .as_deref()
                .filter(|b| !b.is_empty())
                .ok_or_else(|| {
                    ModelError::Config(
                        "provider 'openwebui' requires base_url in config".to_string(),
                    )
                })?;
            let url = format!("{}/api/chat/completions", base.trim_end_matches('/'));
            Ok(Box::new(ChatCompletionsProvider::new(
                meta.id,
                model.to_string(),
                api_key,
                url,
                timeout,
            )))
        }
        "brave" => {
            let endpoint = config
                .base_url
                .as_deref()
                .filter(|b| !b.is_empty())
                .unwrap_or(meta.default_endpoint.expect("brave has a default endpoint"));
            Ok(Box::new(BraveProvider::new(api_key, endpoint, timeout)))
        }
        other => Err(ModelError::Config(format!("provider '{other}' not constructible"))),
    }
}

/// Key resolution order: explicit `api_key` in config, then the provider's
/// canonical environment variable.
fn resolve_api_key(
    config: &aifr_config::Config,
    meta: &registry::ProviderMeta,
) -> Result<String, ModelError> {
    if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }
    match std::env::var(meta.api_key_env) {
        Ok(key) if !key.is_empty() => Ok(key),
        _ => Err(ModelError::Config(format!(
            "missing API key for {}: set {} or api_key in config",
            meta.name, meta.api_key_env
        ))),
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

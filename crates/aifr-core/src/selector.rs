// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Model selection: explicit override, custom-agent pin, keyword class,
//! then context escalation.

use std::collections::HashMap;

use aifr_model::ModelError;

/// The large-window model that context escalation switches to.
pub const ESCALATION_MODEL: &str = "openai/gpt-oss-120b";

/// Sherlock routing targets per keyword class.
pub const MODEL_DOCUMENTS: &str = "Bielik-11B-v2.6-Instruct";
pub const MODEL_CREATIVE: &str = "openai/gpt-oss-120b";
pub const MODEL_DIALOG: &str = "PLLuM-8x7B-chat";
pub const MODEL_ANALYSIS: &str = "DeepSeek-R1-Distill-Llama-70B";
pub const MODEL_FALLBACK: &str = "Llama-3.1-8B-Instruct";

/// OpenAI default when no explicit model is given.
const OPENAI_DEFAULT: &str = "gpt-4o-mini";

// Keyword classes, checked in this order. Sorted within each table.
const DOCUMENT_KEYWORDS: &[&str] = &[
    "document", "dokument", "podsumuj", "raport", "report", "streść", "summar", "tldr",
];
const CREATIVE_KEYWORDS: &[&str] = &[
    "create", "imagine", "napisz", "opowiadanie", "poem", "story", "wiersz",
];
const DIALOG_KEYWORDS: &[&str] = &[
    "chat", "dialog", "porozmawiaj", "rozmawia", "rozmowa", "talk",
];
const ANALYSIS_KEYWORDS: &[&str] = &[
    "analiz", "analy", "błąd", "debug", "dlaczego", "error", "fix", "why",
];

/// Everything model selection looks at.
#[derive(Debug)]
pub struct SelectionInput<'a> {
    pub prompt: &'a str,
    /// Raw `-m` value, not yet alias-resolved.
    pub explicit_model: Option<&'a str>,
    /// Model pinned by a custom agent.
    pub agent_model: Option<&'a str>,
    /// Post-window token estimate for the composed conversation.
    pub estimated_tokens: usize,
    pub context_limit: usize,
    /// Resolved provider id the call will go to.
    pub provider: &'a str,
    pub aliases: &'a HashMap<String, String>,
    /// `model_default` from config.
    pub model_default: Option<&'a str>,
}

/// A resolved selection.
#[derive(Debug, PartialEq, Eq)]
pub struct Selection {
    pub model: String,
    /// Provider carried by a `provider/model` explicit override.
    pub provider_override: Option<String>,
    /// True when the user pinned the model with `-m`.
    pub explicit: bool,
    /// True when context escalation replaced the routed model.
    pub escalated: bool,
    /// True when the estimate is over the limit but an explicit override
    /// suppressed escalation; the caller should warn on stderr.
    pub over_limit_warning: bool,
}

fn keyword_class_model(lower_prompt: &str) -> &'static str {
    let contains_any = |needles: &[&str]| needles.iter().any(|n| lower_prompt.contains(n));
    if contains_any(DOCUMENT_KEYWORDS) {
        MODEL_DOCUMENTS
    } else if contains_any(CREATIVE_KEYWORDS) {
        MODEL_CREATIVE
    } else if contains_any(DIALOG_KEYWORDS) {
        MODEL_DIALOG
    } else if contains_any(ANALYSIS_KEYWORDS) {
        MODEL_ANALYSIS
    } else {
        MODEL_FALLBACK
    }
}

/// Select the model id (and possibly a provider override) for one call.
///
/// Decision order: explicit `-m` (alias-resolved, `provider/model` splits) >
/// custom-agent pin > keyword class for sherlock / provider default
/// otherwise. Context escalation then force-switches to
/// [`ESCALATION_MODEL`], unless the user pinned the model explicitly, in
/// which case the pin wins and only a warning is emitted.
pub fn select(input: &SelectionInput<'_>) -> Result<Selection, ModelError> {
    if let Some(raw) = input.explicit_model {
        // Exact-match alias resolution, then provider/model splitting.
        let resolved = input.aliases.get(raw).map(String::as_str).unwrap_or(raw);
        let (provider_override, model) = match resolved.split_once('/') {
            Some((provider, model)) if !provider.is_empty() && !model.is_empty() => {
                (Some(provider.to_string()), model.to_string())
            }
            _ => (None, resolved.to_string()),
        };
        return Ok(Selection {
            model,
            provider_override,
            explicit: true,
            escalated: false,
            over_limit_warning: input.estimated_tokens > input.context_limit,
        });
    }

    let mut model = if let Some(pinned) = input.agent_model {
        pinned.to_string()
    } else {
        match input.provider {
            "sherlock" => keyword_class_model(&input.prompt.to_ascii_lowercase()).to_string(),
            "openai" => input.model_default.unwrap_or(OPENAI_DEFAULT).to_string(),
            "openwebui" => match input.model_default {
                Some(m) if !m.is_empty() => m.to_string(),
                _ => {
                    return Err(ModelError::Config(
                        "provider 'openwebui' needs model_default in config (or pass -m)"
                            .to_string(),
                    ))
                }
            },
            // The summarizer has no model concept; the id is informational.
            "brave" => "brave-summarizer".to_string(),
            other => {
                return Err(ModelError::Config(format!(
                    "no default model for provider '{other}'"
                )))
            }
        }
    };

    let mut escalated = false;
    if input.estimated_tokens > input.context_limit && input.provider == "sherlock" {
        model = ESCALATION_MODEL.to_string();
        escalated = true;
    }

    Ok(Selection {
        model,
        provider_override: None,
        explicit: false,
        escalated,
        over_limit_warning: false,
    })
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

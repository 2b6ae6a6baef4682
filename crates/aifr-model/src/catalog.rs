// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Static model catalog: the models the selector can route to, with enough
//! metadata to render `aifr --list-models`.

/// One known model.
#[derive(Debug, Clone)]
pub struct ModelCatalogEntry {
    /// Model id forwarded to the provider API.
    pub id: &'static str,
    pub provider: &'static str,
    /// The request class the selector routes here, or "default".
    pub routed_for: &'static str,
    pub description: &'static str,
    /// Advertised context window in tokens (0 = unknown).
    pub context_window: u32,
}

pub static CATALOG: &[ModelCatalogEntry] = &[
    ModelCatalogEntry {
        id: "Llama-3.1-8B-Instruct",
        provider: "sherlock",
        routed_for: "default",
        description: "Fast general-purpose fallback",
        context_window: 128_000,
    },
    ModelCatalogEntry {
        id: "Bielik-11B-v2.6-Instruct",
        provider: "sherlock",
        routed_for: "documents",
        description: "Polish-tuned model for document and summary work",
        context_window: 32_000,
    },
    ModelCatalogEntry {
        id: "PLLuM-8x7B-chat",
        provider: "sherlock",
        routed_for: "dialog",
        description: "Conversational Polish/English mixture model",
        context_window: 32_000,
    },
    ModelCatalogEntry {
        id: "DeepSeek-R1-Distill-Llama-70B",
        provider: "sherlock",
        routed_for: "analysis",
        description: "Reasoning distill for debugging and analysis",
        context_window: 64_000,
    },
    ModelCatalogEntry {
        id: "openai/gpt-oss-120b",
        provider: "sherlock",
        routed_for: "creative / large context",
        description: "Large-window model; also the context-escalation target",
        context_window: 131_072,
    },
    ModelCatalogEntry {
        id: "gpt-4o-mini",
        provider: "openai",
        routed_for: "default",
        description: "OpenAI default when no explicit model is given",
        context_window: 128_000,
    },
];

/// All catalog entries for one provider, in declaration order.
pub fn for_provider(provider: &str) -> Vec<&'static ModelCatalogEntry> {
    CATALOG
        .iter()
        .filter(|e| e.provider.eq_ignore_ascii_case(provider))
        .collect()
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

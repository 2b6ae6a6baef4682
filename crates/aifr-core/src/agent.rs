// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Agent classification: map the prompt and its attachments to a register.
//!
//! Classification is deterministic and stateless. Keyword tables are
//! bilingual (Polish + English), kept sorted, and matched over a plain
//! ASCII-lowercased copy of the prompt so locale settings cannot change
//! the result.

use std::collections::HashMap;

use aifr_config::CustomAgent;
use thiserror::Error;

use crate::prompts;

/// Attached file size at which a request is treated as summarization work
/// even without a summary keyword.
pub const SUMMARIZER_FILE_BYTES: u64 = 64 * 1024;

// Keyword tables, priority order DEBUGGER > CODER > CREATIVE > SUMMARIZER.
// Sorted alphabetically within each table.
const DEBUGGER_KEYWORDS: &[&str] = &[
    "broken", "błąd", "debug", "error", "exception", "fail", "fix", "traceback",
];
const CODER_KEYWORDS: &[&str] = &[
    "class", "code", "function", "implement", "klasa", "kod", "refactor",
];
const CREATIVE_KEYWORDS: &[&str] = &[
    "create", "imagine", "napisz", "opowiadanie", "poem", "story", "wiersz",
];
const SUMMARIZER_KEYWORDS: &[&str] = &[
    "explain", "podsumuj", "streść", "summarize", "tldr", "wytłumacz",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentKind {
    Debugger,
    Summarizer,
    Creative,
    Coder,
    Default,
    Custom(String),
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentKind::Debugger => write!(f, "DEBUGGER"),
            AgentKind::Summarizer => write!(f, "SUMMARIZER"),
            AgentKind::Creative => write!(f, "CREATIVE"),
            AgentKind::Coder => write!(f, "CODER"),
            AgentKind::Default => write!(f, "DEFAULT"),
            AgentKind::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// Everything classification looks at.
#[derive(Debug, Default)]
pub struct ClassifyInput<'a> {
    pub prompt: &'a str,
    pub has_file: bool,
    /// Total bytes across all attachments.
    pub file_bytes: u64,
    pub has_console: bool,
    pub stdin_looks_like_stderr: bool,
}

/// The classification result: a kind, its system prompt, and (for custom
/// agents) an optional pinned model.
#[derive(Debug)]
pub struct Classification {
    pub kind: AgentKind,
    pub system_prompt: String,
    pub model_override: Option<String>,
}

#[derive(Debug, Error)]
#[error("unknown agent '{0}'; define it under custom_agents in config")]
pub struct UnknownAgentError(pub String);

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Classify one request.
///
/// An explicit `--agent <name>` bypasses keyword matching entirely and
/// resolves against the configured custom agents.
pub fn classify(
    input: &ClassifyInput<'_>,
    explicit: Option<&str>,
    custom_agents: &HashMap<String, CustomAgent>,
) -> Result<Classification, UnknownAgentError> {
    if let Some(name) = explicit {
        let agent = custom_agents
            .get(name)
            .ok_or_else(|| UnknownAgentError(name.to_string()))?;
        return Ok(Classification {
            kind: AgentKind::Custom(name.to_string()),
            system_prompt: agent.system_prompt.clone(),
            model_override: agent.model.clone(),
        });
    }

    let lower = input.prompt.to_ascii_lowercase();

    let kind = if input.has_console
        || input.stdin_looks_like_stderr
        || contains_any(&lower, DEBUGGER_KEYWORDS)
    {
        AgentKind::Debugger
    } else if input.has_file && contains_any(&lower, CODER_KEYWORDS) {
        AgentKind::Coder
    } else if contains_any(&lower, CREATIVE_KEYWORDS) {
        AgentKind::Creative
    } else if contains_any(&lower, SUMMARIZER_KEYWORDS)
        || (input.has_file && input.file_bytes >= SUMMARIZER_FILE_BYTES)
    {
        AgentKind::Summarizer
    } else {
        AgentKind::Default
    };

    let system_prompt = prompts::for_kind(&kind).to_string();
    Ok(Classification {
        kind,
        system_prompt,
        model_override: None,
    })
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

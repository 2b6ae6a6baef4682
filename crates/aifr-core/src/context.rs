// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Context assembly: sliding window over the persisted history plus a
//! token-budget trim.
//!
//! Pure functions only. Nothing here performs I/O or mutates the persisted
//! state; persistence happens in the session store after a successful
//! response.

use aifr_model::Message;

/// The composed outgoing conversation.
#[derive(Debug)]
pub struct ComposedContext {
    /// `[system] ++ windowed history ++ [new user]`.
    pub messages: Vec<Message>,
    /// 4-chars-per-token estimate over `messages`.
    pub estimated_tokens: usize,
    /// True when the trim bottomed out at `[system, new user]` and the
    /// estimate is still over the limit; the selector must escalate.
    pub needs_escalation: bool,
}

fn estimate(messages: &[Message]) -> usize {
    messages.iter().map(Message::approx_tokens).sum()
}

/// Assemble the outgoing messages for one call.
///
/// 1. Start with the system prompt.
/// 2. Keep at most the last `max_turns` user+assistant pairs of history.
/// 3. Append the new user message.
/// 4. While the estimate exceeds `context_limit`, drop the oldest surviving
///    pair. When only the system prompt and the new user message remain,
///    return as-is with `needs_escalation` set.
pub fn build_messages(
    system_prompt: &str,
    history: &[Message],
    new_user: Message,
    max_turns: usize,
    context_limit: usize,
) -> ComposedContext {
    // Persisted history holds whole pairs (a dangling user turn is never
    // written), so a tail slice of 2·max_turns stays pair-aligned.
    let window_start = history.len().saturating_sub(max_turns * 2);
    let mut window: Vec<Message> = history[window_start..].to_vec();

    let assemble = |window: &[Message]| {
        let mut messages = Vec::with_capacity(window.len() + 2);
        messages.push(Message::system(system_prompt));
        messages.extend_from_slice(window);
        messages.push(new_user.clone());
        messages
    };

    let mut messages = assemble(&window);
    let mut estimated_tokens = estimate(&messages);

    while estimated_tokens > context_limit && !window.is_empty() {
        window.drain(..2.min(window.len()));
        messages = assemble(&window);
        estimated_tokens = estimate(&messages);
    }

    ComposedContext {
        needs_escalation: estimated_tokens > context_limit,
        messages,
        estimated_tokens,
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

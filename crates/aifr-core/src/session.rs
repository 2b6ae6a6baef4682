// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Session persistence: the only durable link between invocations.
//!
//! Each invocation is a fresh process, so the session file is the source
//! of truth for conversation memory. Writes go through a temp file in the
//! same directory, fsync, then an atomic rename, so a reader never observes
//! a half-written file and a crash leaves the previous state intact.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use aifr_model::{Message, Role};

/// Sessions older than this are discarded on load.
pub fn session_ttl() -> Duration {
    Duration::hours(4)
}

const SESSION_VERSION: u32 = 1;

/// On-disk shape of the session file.
#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    version: u32,
    last_updated: DateTime<Utc>,
    messages: Vec<Message>,
}

/// In-memory conversation state.
///
/// Invariants: never contains a system message; when non-empty, starts
/// with a user message and alternates user/assistant in whole pairs.
#[derive(Debug, Clone)]
pub struct ConversationState {
    pub messages: Vec<Message>,
    pub last_updated: DateTime<Utc>,
}

impl ConversationState {
    pub fn empty() -> Self {
        Self {
            messages: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    /// Shape check for the persistence invariants.
    fn is_well_formed(messages: &[Message]) -> bool {
        if messages.len() % 2 != 0 {
            return false;
        }
        messages.iter().enumerate().all(|(i, m)| {
            let expect = if i % 2 == 0 { Role::User } else { Role::Assistant };
            m.role == expect
        })
    }
}

/// File-backed store for one conversation.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default session location: `<cache_dir>/aifr/session.json`, or for a
    /// named session `<cache_dir>/aifr/sessions/<name>.json`.
    pub fn at_default_location(name: Option<&str>) -> Self {
        let base = dirs::cache_dir()
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".cache")
            })
            .join("aifr");
        let path = match name {
            Some(n) => base.join("sessions").join(format!("{n}.json")),
            None => base.join("session.json"),
        };
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted state.
    ///
    /// Non-fatal by design: a missing file, unparseable JSON, a shape that
    /// violates the alternation invariant, or a stale `last_updated` all
    /// yield an empty state. Only malformed JSON gets a stderr notice;
    /// that is the one case where user data is silently at risk.
    pub fn load(&self) -> ConversationState {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(_) => return ConversationState::empty(),
        };

        let file: SessionFile = match serde_json::from_str(&text) {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "aifr: session file {} is malformed ({e}); starting fresh",
                    self.path.display()
                );
                return ConversationState::empty();
            }
        };

        if Utc::now() - file.last_updated > session_ttl() {
            debug!(path = %self.path.display(), "session expired, starting fresh");
            return ConversationState::empty();
        }

        if !ConversationState::is_well_formed(&file.messages) {
            warn!(path = %self.path.display(), "session violates alternation invariant, discarding");
            return ConversationState::empty();
        }

        ConversationState {
            messages: file.messages,
            last_updated: file.last_updated,
        }
    }

    /// Append one completed turn: both messages or neither become durable.
    pub fn append(
        &self,
        state: &mut ConversationState,
        user: Message,
        assistant: Message,
    ) -> anyhow::Result<()> {
        state.messages.push(user);
        state.messages.push(assistant);
        state.last_updated = Utc::now();
        self.write(state)
    }

    fn write(&self, state: &ConversationState) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let file = SessionFile {
            version: SESSION_VERSION,
            last_updated: state.last_updated,
            messages: state.messages.clone(),
        };
        let json = serde_json::to_vec_pretty(&file).context("serializing session")?;

        // Temp file in the same directory so the rename cannot cross a
        // filesystem boundary.
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut f = std::fs::File::create(&tmp)
                .with_context(|| format!("creating {}", tmp.display()))?;
            f.write_all(&json)
                .with_context(|| format!("writing {}", tmp.display()))?;
            f.sync_all()
                .with_context(|| format!("syncing {}", tmp.display()))?;
        }
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("renaming {} into place", tmp.display()))?;

        debug!(path = %self.path.display(), messages = state.messages.len(), "session saved");
        Ok(())
    }

    /// Delete the session file. Idempotent.
    pub fn clear(&self) -> anyhow::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing {}", self.path.display())),
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Context-attachment collaborators: attached files (with the sensitivity
//! and size guard), captured command output, and piped stdin.

use thiserror::Error;

pub mod console;
pub mod file;
pub mod stdin;

pub use console::{run as capture_command, Capture};
pub use file::{is_sensitive, load as load_file, LoadedFile, MAX_FILE_BYTES};
pub use stdin::{drain as drain_stdin, looks_like_stderr};

#[derive(Debug, Error)]
pub enum InputError {
    /// The path matches a sensitive pattern; nothing was read.
    #[error("refusing to read sensitive file: {path}")]
    SensitiveFile { path: String },

    #[error("file too large ({size} bytes, limit {limit}): {path}")]
    Oversize { path: String, size: u64, limit: u64 },

    #[error("{what}: {source}")]
    Io {
        what: String,
        #[source]
        source: std::io::Error,
    },

    #[error("timed out after {secs}s: {what}")]
    Timeout { what: String, secs: u64 },
}

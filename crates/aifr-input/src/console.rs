// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Command capture for the `-c` flag: run a shell command and hand its
//! combined output to the model.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use crate::InputError;

/// Captured output of one command run.
#[derive(Debug, Clone)]
pub struct Capture {
    /// stdout and stderr, interleaved as the process produced them.
    pub output: String,
    /// Process exit code (`-1` when terminated by a signal).
    pub exit_status: i32,
}

/// Run `cmd` through `bash -c`, capturing stdout and stderr into one
/// stream. Returns the capture even on non-zero exit; a failing command
/// is exactly what the user wants the model to look at.
pub async fn run(cmd: &str, timeout_secs: u64) -> Result<Capture, InputError> {
    debug!(cmd = %cmd, "capturing command output");

    // `2>&1` at the shell level keeps the interleaving the terminal would
    // show; reading two pipes and concatenating would reorder lines.
    let mut child = Command::new("bash");
    child
        .arg("-c")
        .arg(format!("exec 2>&1; {cmd}"))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let result = tokio::time::timeout(Duration::from_secs(timeout_secs), child.output()).await;

    match result {
        Ok(Ok(output)) => Ok(Capture {
            output: String::from_utf8_lossy(&output.stdout).into_owned(),
            exit_status: output.status.code().unwrap_or(-1),
        }),
        Ok(Err(source)) => Err(InputError::Io {
            what: cmd.to_string(),
            source,
        }),
        Err(_) => Err(InputError::Timeout {
            what: cmd.to_string(),
            secs: timeout_secs,
        }),
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

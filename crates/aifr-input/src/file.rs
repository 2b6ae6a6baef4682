// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Attached-file loading with a sensitivity and size guard.
//!
//! The guard runs on the path before any bytes are read: key material and
//! credential files never leave the machine, and nothing larger than 5 MiB
//! is shipped to a model.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::InputError;

/// Hard ceiling for one attachment.
pub const MAX_FILE_BYTES: u64 = 5 * 1024 * 1024;

/// File-name fragments that mark a file as sensitive regardless of location.
const SENSITIVE_NAME_PARTS: &[&str] = &["id_rsa", "id_ed25519", "credentials", "secrets"];

/// Extensions that mark key material.
const SENSITIVE_EXTENSIONS: &[&str] = &["pem", "key"];

/// One loaded attachment.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub content: String,
    pub size: u64,
}

/// Returns `true` when the path must not be sent to a remote model.
///
/// Matching is case-insensitive over the expanded path: `.env` files,
/// SSH key names, `*.pem` / `*.key`, anything under a `.ssh/` directory,
/// and names containing `credentials` or `secrets`.
pub fn is_sensitive(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    if name == ".env" || name.starts_with(".env.") {
        return true;
    }
    if SENSITIVE_NAME_PARTS.iter().any(|p| name.contains(p)) {
        return true;
    }
    if let Some(ext) = path.extension().map(|e| e.to_string_lossy().to_ascii_lowercase()) {
        if SENSITIVE_EXTENSIONS.contains(&ext.as_str()) {
            return true;
        }
    }
    path.components()
        .any(|c| c.as_os_str().to_string_lossy().eq_ignore_ascii_case(".ssh"))
}

/// Load one attachment: expand `~`, run the guard, read with a timeout,
/// decode as UTF-8 with lossy replacement.
pub async fn load(raw_path: &str, timeout_secs: u64) -> Result<LoadedFile, InputError> {
    let expanded = shellexpand::tilde(raw_path).into_owned();
    let path = PathBuf::from(expanded);

    if is_sensitive(&path) {
        return Err(InputError::SensitiveFile { path: path.display().to_string() });
    }

    let meta = tokio::fs::metadata(&path).await.map_err(|source| InputError::Io {
        what: path.display().to_string(),
        source,
    })?;
    if meta.len() > MAX_FILE_BYTES {
        return Err(InputError::Oversize {
            path: path.display().to_string(),
            size: meta.len(),
            limit: MAX_FILE_BYTES,
        });
    }

    let read = tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        tokio::fs::read(&path),
    )
    .await
    .map_err(|_| InputError::Timeout {
        what: path.display().to_string(),
        secs: timeout_secs,
    })?
    .map_err(|source| InputError::Io {
        what: path.display().to_string(),
        source,
    })?;

    debug!(path = %path.display(), bytes = read.len(), "loaded attachment");

    Ok(LoadedFile {
        content: String::from_utf8_lossy(&read).into_owned(),
        size: meta.len(),
        path,
    })
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    // ── Sensitivity guard ─────────────────────────────────────────────────────

    #[test]
    fn env_files_are_sensitive() {
        assert!(is_sensitive(Path::new("/home/u/project/.env")));
        assert!(is_sensitive(Path::new(".env.production")));
    }

    #[test]
    fn ssh_keys_are_sensitive() {
        assert!(is_sensitive(Path::new("/home/u/.ssh/id_rsa")));
        assert!(is_sensitive(Path::new("id_ed25519.pub")));
    }

    #[test]
    fn anything_under_dot_ssh_is_sensitive() {
        assert!(is_sensitive(Path::new("/home/u/.ssh/known_hosts")));
    }

    #[test]
    fn key_material_extensions_are_sensitive() {
        assert!(is_sensitive(Path::new("server.pem")));
        assert!(is_sensitive(Path::new("tls.KEY")));
    }

    #[test]
    fn credentials_and_secrets_names_are_sensitive() {
        assert!(is_sensitive(Path::new("/home/u/.aws/credentials")));
        assert!(is_sensitive(Path::new("app-secrets.json")));
    }

    #[test]
    fn ordinary_files_pass_the_guard() {
        assert!(!is_sensitive(Path::new("src/main.rs")));
        assert!(!is_sensitive(Path::new("notes/environment.md")));
        assert!(!is_sensitive(Path::new("README.md")));
    }

    // ── Loading ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn load_reads_utf8_content() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "fn main() {{}}").unwrap();
        let loaded = load(f.path().to_str().unwrap(), 10).await.unwrap();
        assert_eq!(loaded.content, "fn main() {}");
        assert_eq!(loaded.size, 12);
    }

    #[tokio::test]
    async fn load_replaces_invalid_utf8() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&[b'o', b'k', 0xFF, b'!']).unwrap();
        let loaded = load(f.path().to_str().unwrap(), 10).await.unwrap();
        assert!(loaded.content.starts_with("ok"));
        assert!(loaded.content.contains('\u{FFFD}'));
    }

    #[tokio::test]
    async fn load_refuses_sensitive_path_without_reading() {
        let err = load("~/.ssh/id_rsa", 10).await.unwrap_err();
        assert!(matches!(err, InputError::SensitiveFile { .. }));
        assert!(err.to_string().contains("sensitive"));
    }

    #[tokio::test]
    async fn load_reports_missing_file_as_io() {
        let err = load("/tmp/aifr_no_such_file_xyz.txt", 10).await.unwrap_err();
        assert!(matches!(err, InputError::Io { .. }));
    }

    #[tokio::test]
    async fn load_refuses_oversize_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        // Sparse-ish: still writes, but 6 MiB of zeros is fast.
        f.write_all(&vec![b'a'; (MAX_FILE_BYTES + 1) as usize]).unwrap();
        let err = load(f.path().to_str().unwrap(), 10).await.unwrap_err();
        assert!(matches!(err, InputError::Oversize { .. }));
    }
}

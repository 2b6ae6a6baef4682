// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::Config;

/// Default config file location: `<config_dir>/aifr/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
        })
        .join("aifr")
        .join("config.json")
}

/// Load configuration.
///
/// A missing file yields defaults (first-run experience needs no config).
/// A file that exists but fails to parse is an error: silently dropping a
/// config the user wrote would send requests to the wrong backend.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<Config> {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);

    if !path.is_file() {
        if explicit.is_some() {
            anyhow::bail!("config file not found: {}", path.display());
        }
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    debug!(path = %path.display(), "loading config");
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config: Config = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_returns_error_when_explicit_path_missing() {
        let result = load(Some(Path::new("/tmp/aifr_nonexistent_config_xyz.json")));
        assert!(result.is_err());
    }

    #[test]
    fn load_explicit_file_overrides_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"provider": "openai", "context_limit": 9000}}"#).unwrap();
        let cfg = load(Some(f.path())).unwrap();
        assert_eq!(cfg.provider.as_deref(), Some("openai"));
        assert_eq!(cfg.context_limit, 9000);
    }

    #[test]
    fn load_rejects_malformed_json() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "{{not json").unwrap();
        let err = load(Some(f.path())).unwrap_err();
        assert!(format!("{err:#}").contains("parsing"));
    }

    #[test]
    fn default_path_ends_with_aifr_config_json() {
        let p = default_config_path();
        assert!(p.ends_with("aifr/config.json"));
    }
}

//! Piped-stdin drain.

use tokio::io::AsyncReadExt;

use crate::InputError;

/// Read all of stdin, decoding as UTF-8 with lossy replacement.
///
/// Only called when stdin is not a TTY; reading a terminal here would
/// block forever waiting for EOF.
pub async fn drain() -> Result<String, InputError> {
    let mut buf = Vec::new();
    tokio::io::stdin()
        .read_to_end(&mut buf)
        .await
        .map_err(|source| InputError::Io {
            what: "stdin".to_string(),
            source,
        })?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Substrings that mark piped input as a captured error stream.
/// Checked within the first 4 KiB only; diagnostics lead, logs trail.
const STDERR_MARKERS: &[&str] = &["Traceback", "Error:", "Exception", "FAILED", "at line"];

/// Heuristic: does this piped input look like somebody's stderr?
pub fn looks_like_stderr(input: &str) -> bool {
    let mut end = input.len().min(4096);
    while !input.is_char_boundary(end) {
        end -= 1;
    }
    let head = &input[..end];
    STDERR_MARKERS.iter().any(|m| head.contains(m))
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_traceback_is_stderr() {
        assert!(looks_like_stderr(
            "Traceback (most recent call last):\n  File \"x.py\", line 1\n"
        ));
    }

    #[test]
    fn pytest_failure_is_stderr() {
        assert!(looks_like_stderr("FAILED test_x.py::test_a"));
    }

    #[test]
    fn rust_panic_location_is_stderr() {
        assert!(looks_like_stderr("thread 'main' panicked at line 42"));
    }

    #[test]
    fn plain_text_is_not_stderr() {
        assert!(!looks_like_stderr("line1\nline2\n"));
    }

    #[test]
    fn marker_past_first_4kib_is_ignored() {
        let mut input = "x".repeat(5000);
        input.push_str("Error: too late");
        assert!(!looks_like_stderr(&input));
    }

    #[test]
    fn empty_input_is_not_stderr() {
        assert!(!looks_like_stderr(""));
    }
}

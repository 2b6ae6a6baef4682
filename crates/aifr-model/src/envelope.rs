// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Envelope markers delimiting injected context inside a user message.
//!
//! Downstream models are trained against these exact marker lines; they are
//! a wire contract and must never be paraphrased or reordered.

/// Marker lines. Byte-exact ASCII.
pub const FILE_START: &str = "===FILE_START===";
pub const FILE_END: &str = "===FILE_END===";
pub const CONSOLE_START: &str = "===CONSOLE_START===";
pub const CONSOLE_END: &str = "===CONSOLE_END===";
pub const STDIN_START: &str = "===STDIN_START===";
pub const STDIN_END: &str = "===STDIN_END===";

// Content that already ends in a newline keeps it as the separator before
// the END marker; adding another would change the bytes the model sees.
fn wrap(start: &str, content: &str, end: &str) -> String {
    let sep = if content.ends_with('\n') { "" } else { "\n" };
    format!("{start}\n{content}{sep}{end}")
}

/// Wrap attached file content in a FILE envelope.
pub fn wrap_file(content: &str) -> String {
    wrap(FILE_START, content, FILE_END)
}

/// Wrap captured command output in a CONSOLE envelope.
pub fn wrap_console(content: &str) -> String {
    wrap(CONSOLE_START, content, CONSOLE_END)
}

/// Wrap piped stdin in a STDIN envelope.
pub fn wrap_stdin(content: &str) -> String {
    wrap(STDIN_START, content, STDIN_END)
}

/// Compose the outgoing user message: the prompt followed by envelopes in
/// fixed order, FILE (one per attachment, argv order), then CONSOLE, then
/// STDIN. Missing pieces produce no envelope.
pub fn build_user_message(
    prompt: &str,
    files: &[String],
    console: Option<&str>,
    stdin: Option<&str>,
) -> String {
    let mut parts: Vec<String> = vec![prompt.to_string()];
    for f in files {
        parts.push(wrap_file(f));
    }
    if let Some(c) = console {
        parts.push(wrap_console(c));
    }
    if let Some(s) = stdin {
        parts.push(wrap_stdin(s));
    }
    parts.join("\n\n")
}

fn is_start_marker(line: &str) -> Option<&'static str> {
    match line {
        FILE_START => Some(FILE_END),
        CONSOLE_START => Some(CONSOLE_END),
        STDIN_START => Some(STDIN_END),
        _ => None,
    }
}

/// Remove every envelope block (marker lines and the content between them),
/// leaving the surrounding plain text.
///
/// Used by the Brave adapter to turn a composed user message back into a
/// bare query string. An unterminated block is dropped through end of input.
pub fn strip_envelopes(text: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut skip_until: Option<&str> = None;

    for line in text.lines() {
        match skip_until {
            Some(end) => {
                if line == end {
                    skip_until = None;
                }
            }
            None => {
                if let Some(end) = is_start_marker(line) {
                    skip_until = Some(end);
                } else {
                    kept.push(line);
                }
            }
        }
    }

    kept.join("\n").trim().to_string()
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_file_is_byte_exact() {
        assert_eq!(wrap_file("body"), "===FILE_START===\nbody\n===FILE_END===");
    }

    #[test]
    fn wrap_does_not_double_a_trailing_newline() {
        assert_eq!(
            wrap_stdin("line1\nline2\n"),
            "===STDIN_START===\nline1\nline2\n===STDIN_END==="
        );
    }

    #[test]
    fn build_keeps_fixed_envelope_order() {
        let msg = build_user_message("ask", &["f1".into()], Some("out"), Some("in"));
        let file_pos = msg.find(FILE_START).unwrap();
        let console_pos = msg.find(CONSOLE_START).unwrap();
        let stdin_pos = msg.find(STDIN_START).unwrap();
        assert!(msg.starts_with("ask"));
        assert!(file_pos < console_pos && console_pos < stdin_pos);
    }

    #[test]
    fn build_repeats_file_envelopes_in_order() {
        let msg = build_user_message("p", &["first".into(), "second".into()], None, None);
        let a = msg.find("first").unwrap();
        let b = msg.find("second").unwrap();
        assert!(a < b);
        assert_eq!(msg.matches(FILE_START).count(), 2);
        assert_eq!(msg.matches(FILE_END).count(), 2);
    }

    #[test]
    fn build_without_attachments_is_just_the_prompt() {
        assert_eq!(build_user_message("just ask", &[], None, None), "just ask");
    }

    #[test]
    fn strip_reproduces_original_prompt() {
        let msg = build_user_message("What does this do?", &["fn main() {}".into()], None, None);
        assert_eq!(strip_envelopes(&msg), "What does this do?");
    }

    #[test]
    fn strip_removes_all_envelope_kinds() {
        let msg = build_user_message("q", &["f".into()], Some("c"), Some("s"));
        let stripped = strip_envelopes(&msg);
        assert_eq!(stripped, "q");
        assert!(!stripped.contains("==="));
    }

    #[test]
    fn strip_drops_unterminated_block() {
        let text = format!("prompt\n\n{FILE_START}\ndangling content");
        assert_eq!(strip_envelopes(&text), "prompt");
    }

    #[test]
    fn strip_keeps_marker_lookalikes_inside_plain_text() {
        let text = "mentioning ===FILE_START=== mid-sentence is fine";
        assert_eq!(strip_envelopes(text), text);
    }
}

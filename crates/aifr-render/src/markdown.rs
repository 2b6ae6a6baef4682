// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Markdown → ANSI colorizer for terminal output.
//!
//! A pure function of its input: no terminal probing, no configuration.
//! The caller decides whether to colorize at all (TTY detection and the
//! `--raw` flag live in the binary).

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Parser, Tag, TagEnd};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const ITALIC: &str = "\x1b[3m";
const DIM: &str = "\x1b[2m";
const CYAN: &str = "\x1b[36m";
const YELLOW: &str = "\x1b[33m";
const UNDERLINE: &str = "\x1b[4m";

/// Render markdown to a string with ANSI styling.
pub fn render(text: &str) -> String {
    let parser = Parser::new(text);
    let mut out = String::new();

    // Active inline styles, re-applied after every reset so nesting works.
    let mut styles: Vec<&'static str> = Vec::new();
    let mut in_code_block = false;
    // One entry per open list; `Some(n)` carries the next ordinal.
    let mut lists: Vec<Option<u64>> = Vec::new();

    let apply = |styles: &[&'static str], out: &mut String| {
        out.push_str(RESET);
        for s in styles {
            out.push_str(s);
        }
    };

    for event in parser {
        match event {
            // ── Headings ─────────────────────────────────────────────────────
            Event::Start(Tag::Heading { level, .. }) => {
                let marker = match level {
                    HeadingLevel::H1 => "# ",
                    HeadingLevel::H2 => "## ",
                    _ => "### ",
                };
                out.push_str(BOLD);
                out.push_str(CYAN);
                out.push_str(marker);
                styles.push(BOLD);
                styles.push(CYAN);
            }
            Event::End(TagEnd::Heading(_)) => {
                styles.clear();
                out.push_str(RESET);
                out.push_str("\n\n");
            }

            // ── Paragraphs and breaks ────────────────────────────────────────
            Event::Start(Tag::Paragraph) => {}
            Event::End(TagEnd::Paragraph) => out.push_str("\n\n"),
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            Event::Rule => {
                out.push_str(DIM);
                out.push_str("────────────────────────────────");
                out.push_str(RESET);
                out.push_str("\n\n");
            }

            // ── Inline styles ────────────────────────────────────────────────
            Event::Start(Tag::Strong) => {
                styles.push(BOLD);
                out.push_str(BOLD);
            }
            Event::End(TagEnd::Strong) => {
                styles.retain(|s| *s != BOLD);
                apply(&styles, &mut out);
            }
            Event::Start(Tag::Emphasis) => {
                styles.push(ITALIC);
                out.push_str(ITALIC);
            }
            Event::End(TagEnd::Emphasis) => {
                styles.retain(|s| *s != ITALIC);
                apply(&styles, &mut out);
            }
            Event::Code(code) => {
                out.push_str(YELLOW);
                out.push_str(&code);
                apply(&styles, &mut out);
            }

            // ── Code blocks ──────────────────────────────────────────────────
            Event::Start(Tag::CodeBlock(kind)) => {
                in_code_block = true;
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        out.push_str(DIM);
                        out.push_str(&lang);
                        out.push_str(RESET);
                        out.push('\n');
                    }
                }
                out.push_str(YELLOW);
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                out.push_str(RESET);
                out.push('\n');
            }

            // ── Lists ────────────────────────────────────────────────────────
            Event::Start(Tag::List(start)) => lists.push(start),
            Event::End(TagEnd::List(_)) => {
                lists.pop();
                if lists.is_empty() {
                    out.push('\n');
                }
            }
            Event::Start(Tag::Item) => {
                let depth = lists.len().saturating_sub(1);
                out.push_str(&"  ".repeat(depth));
                match lists.last_mut() {
                    Some(Some(n)) => {
                        out.push_str(&format!("{n}. "));
                        *n += 1;
                    }
                    _ => out.push_str("• "),
                }
            }
            Event::End(TagEnd::Item) => {
                // Tight list items carry bare text; loose ones end with a
                // paragraph that already emitted its newlines.
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }

            // ── Block quotes ─────────────────────────────────────────────────
            Event::Start(Tag::BlockQuote(_)) => {
                styles.push(DIM);
                out.push_str(DIM);
            }
            Event::End(TagEnd::BlockQuote(_)) => {
                styles.retain(|s| *s != DIM);
                apply(&styles, &mut out);
            }

            // ── Links ────────────────────────────────────────────────────────
            Event::Start(Tag::Link { .. }) => {
                styles.push(UNDERLINE);
                out.push_str(UNDERLINE);
            }
            Event::End(TagEnd::Link) => {
                styles.retain(|s| *s != UNDERLINE);
                apply(&styles, &mut out);
            }

            // ── Text ─────────────────────────────────────────────────────────
            Event::Text(t) => out.push_str(&t),
            Event::Html(h) | Event::InlineHtml(h) => out.push_str(&h),
            Event::TaskListMarker(done) => {
                out.push_str(if done { "[x] " } else { "[ ] " });
            }
            _ => {}
        }
    }

    // The event stream ends paragraphs with a blank line; trim to one
    // trailing newline so the caller controls final spacing.
    while out.ends_with('\n') {
        out.pop();
    }
    out.push('\n');
    out
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        let r = render("just a sentence");
        assert!(r.contains("just a sentence"));
    }

    #[test]
    fn heading_is_bold_cyan() {
        let r = render("# Title");
        assert!(r.contains(BOLD));
        assert!(r.contains(CYAN));
        assert!(r.contains("Title"));
    }

    #[test]
    fn inline_code_is_yellow() {
        let r = render("run `cargo test` now");
        assert!(r.contains(&format!("{YELLOW}cargo test")));
    }

    #[test]
    fn fenced_block_is_colored_and_closed() {
        let r = render("```rust\nfn main() {}\n```");
        assert!(r.contains("fn main() {}"));
        assert!(r.ends_with(&format!("{RESET}\n")));
    }

    #[test]
    fn bullets_are_rendered() {
        let r = render("- one\n- two");
        assert!(r.contains("• one"));
        assert!(r.contains("• two"));
    }

    #[test]
    fn ordered_list_counts_up() {
        let r = render("1. first\n2. second");
        assert!(r.contains("1. first"));
        assert!(r.contains("2. second"));
    }

    #[test]
    fn bold_inside_italic_restores_italic() {
        let r = render("*a **b** c*");
        // After **b** closes, italic must be re-applied for "c".
        let after_b = r.split("b").nth(1).unwrap();
        assert!(after_b.contains(ITALIC));
    }

    #[test]
    fn output_ends_with_exactly_one_newline() {
        let r = render("text\n\n\n");
        assert!(r.ends_with('\n'));
        assert!(!r.ends_with("\n\n"));
    }

    #[test]
    fn render_is_pure() {
        let a = render("# Same *input*");
        let b = render("# Same *input*");
        assert_eq!(a, b);
    }
}

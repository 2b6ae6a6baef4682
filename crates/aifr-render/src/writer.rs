// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Chunked output writing.
//!
//! Responses can be hundreds of kilobytes; writes are bounded so a slow
//! pipe reader never forces one giant buffer flush. Chunk boundaries never
//! split a UTF-8 code point or an ANSI escape sequence, since a boundary
//! inside `\x1b[1;36m` would leak garbage into the terminal.

use std::io::Write;

/// Write-size ceiling per chunk.
pub const CHUNK_SIZE: usize = 8192;

/// Write `text` in bounded chunks, then flush.
pub fn write_chunked(out: &mut dyn Write, text: &str) -> std::io::Result<()> {
    for chunk in split_chunks(text, CHUNK_SIZE) {
        out.write_all(chunk.as_bytes())?;
    }
    out.flush()
}

/// Write a response followed by a final newline iff it lacks one.
pub fn write_response(out: &mut dyn Write, text: &str) -> std::io::Result<()> {
    write_chunked(out, text)?;
    if !text.ends_with('\n') {
        out.write_all(b"\n")?;
        out.flush()?;
    }
    Ok(())
}

/// Byte ranges of ANSI escape sequences in `s`.
///
/// Covers CSI sequences (`ESC [ … final-byte`) and two-byte escapes.
fn escape_ranges(s: &str) -> Vec<(usize, usize)> {
    let b = s.as_bytes();
    let mut ranges = Vec::new();
    let mut i = 0;
    while i < b.len() {
        if b[i] == 0x1b {
            let start = i;
            i += 1;
            if i < b.len() && b[i] == b'[' {
                i += 1;
                // Parameter and intermediate bytes, then one final byte.
                while i < b.len() && !(0x40..=0x7e).contains(&b[i]) {
                    i += 1;
                }
                if i < b.len() {
                    i += 1;
                }
            } else if i < b.len() {
                i += 1;
            }
            ranges.push((start, i));
        } else {
            i += 1;
        }
    }
    ranges
}

fn inside_any(ranges: &[(usize, usize)], pos: usize) -> bool {
    ranges.iter().any(|&(a, b)| a < pos && pos < b)
}

/// Split `s` into chunks of at most `max` bytes whose boundaries fall on
/// char boundaries and outside escape sequences.
pub(crate) fn split_chunks(s: &str, max: usize) -> Vec<&str> {
    debug_assert!(max > 0);
    let ranges = escape_ranges(s);
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < s.len() {
        let mut end = (start + max).min(s.len());
        if end < s.len() {
            while end > start && (!s.is_char_boundary(end) || inside_any(&ranges, end)) {
                end -= 1;
            }
            if end == start {
                // Degenerate: a single sequence longer than `max`. Emit it
                // whole rather than corrupt it.
                end = ranges
                    .iter()
                    .find(|&&(a, b)| a <= start && start < b)
                    .map(|&(_, b)| b)
                    .unwrap_or_else(|| (start + max).min(s.len()));
            }
        }
        chunks.push(&s[start..end]);
        start = end;
    }
    chunks
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

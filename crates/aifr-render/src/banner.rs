// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! The `--version` banner: small ASCII art with a 256-color gradient.
//!
//! Only shown on a TTY; piped `--version` output gets a plain
//! `aifr <version>` line instead (the caller decides).

const ART: &[&str] = &[
    r"        _  __      ",
    r"  __ _ (_)/ _|_ __ ",
    r" / _` || | |_| '__|",
    r"| (_| || |  _| |   ",
    r" \__,_||_|_| |_|   ",
];

/// 256-color cyan→blue ramp, one color per art line.
const GRADIENT: &[u8] = &[51, 45, 39, 33, 27];

/// Render the version banner with ANSI colors.
pub fn banner(version: &str) -> String {
    let mut out = String::new();
    for (line, color) in ART.iter().zip(GRADIENT.iter().cycle()) {
        out.push_str(&format!("\x1b[38;5;{color}m{line}\x1b[0m\n"));
    }
    out.push_str(&format!("\naifr {version} - terminal assistant\n"));
    out
}

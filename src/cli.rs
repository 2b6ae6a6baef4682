// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "aifr",
    about = "A terminal assistant bridging your shell to remote language models",
    disable_version_flag = true,
    long_about = None,
)]
pub struct Cli {
    /// The prompt to send
    #[arg(value_name = "PROMPT")]
    pub prompt: Option<String>,

    /// The prompt as a flag (alternative to the positional form)
    #[arg(long = "prompt", short = 'p', value_name = "TEXT")]
    pub prompt_flag: Option<String>,

    /// Attach a file as context (repeatable)
    #[arg(long = "file", short = 'f', value_name = "PATH")]
    pub file: Vec<String>,

    /// Run a command and attach its combined output
    #[arg(long = "console", short = 'c', value_name = "CMD")]
    pub console: Option<String>,

    /// Model id, alias, or provider/model (e.g. "openai/gpt-4o-mini")
    #[arg(long, short = 'm', value_name = "MODEL")]
    pub model: Option<String>,

    /// Override the configured context token limit
    #[arg(long, value_name = "TOKENS")]
    pub context_limit: Option<usize>,

    /// Use a custom agent from config instead of keyword classification
    #[arg(long, value_name = "NAME")]
    pub agent: Option<String>,

    /// Discard the persisted conversation and exit
    #[arg(long, visible_alias = "new")]
    pub reset: bool,

    /// Print agent, model, and token usage to stderr
    #[arg(long, visible_alias = "info")]
    pub stats: bool,

    /// Print the raw response without markdown colorization
    #[arg(long, short = 'r')]
    pub raw: bool,

    /// List known models for the active provider and exit
    #[arg(long)]
    pub list_models: bool,

    /// Use a named session instead of the default one
    #[arg(long, value_name = "NAME")]
    pub session: Option<String>,

    /// Path to the config file (overrides the default location)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print version information and exit
    #[arg(long, short = 'V')]
    pub version: bool,

    /// Generate a shell completion script and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,

    /// Increase verbosity (-v = debug, -vv = trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// The prompt, whichever way it was given. The flag wins when both are
    /// present so scripts can pin it regardless of extra positionals.
    pub fn effective_prompt(&self) -> Option<&str> {
        self.prompt_flag.as_deref().or(self.prompt.as_deref())
    }
}

pub fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "aifr", &mut std::io::stdout());
}

// TTY detection for stdin and stdout.
pub trait IsTerminal {
    fn is_terminal(&self) -> bool;
}

impl IsTerminal for std::io::Stdin {
    fn is_terminal(&self) -> bool {
        #[cfg(unix)]
        {
            use std::os::unix::io::AsRawFd;
            unsafe { libc::isatty(self.as_raw_fd()) != 0 }
        }
        #[cfg(not(unix))]
        {
            false
        }
    }
}

impl IsTerminal for std::io::Stdout {
    fn is_terminal(&self) -> bool {
        #[cfg(unix)]
        {
            use std::os::unix::io::AsRawFd;
            unsafe { libc::isatty(self.as_raw_fd()) != 0 }
        }
        #[cfg(not(unix))]
        {
            false
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positional_prompt() {
        let cli = Cli::parse_from(["aifr", "What is 2+2?"]);
        assert_eq!(cli.effective_prompt(), Some("What is 2+2?"));
    }

    #[test]
    fn prompt_flag_wins_over_positional() {
        let cli = Cli::parse_from(["aifr", "positional", "-p", "flagged"]);
        assert_eq!(cli.effective_prompt(), Some("flagged"));
    }

    #[test]
    fn file_flag_repeats() {
        let cli = Cli::parse_from(["aifr", "read", "-f", "a.rs", "-f", "b.rs"]);
        assert_eq!(cli.file, vec!["a.rs", "b.rs"]);
    }

    #[test]
    fn reset_alias_new_works() {
        let cli = Cli::parse_from(["aifr", "--new"]);
        assert!(cli.reset);
    }

    #[test]
    fn stats_alias_info_works() {
        let cli = Cli::parse_from(["aifr", "hi", "--info"]);
        assert!(cli.stats);
    }

    #[test]
    fn model_and_session_parse() {
        let cli = Cli::parse_from(["aifr", "hi", "-m", "openai/gpt-4o-mini", "--session", "work"]);
        assert_eq!(cli.model.as_deref(), Some("openai/gpt-4o-mini"));
        assert_eq!(cli.session.as_deref(), Some("work"));
    }

    #[test]
    fn no_args_means_no_prompt() {
        let cli = Cli::parse_from(["aifr"]);
        assert_eq!(cli.effective_prompt(), None);
    }
}

// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod cli;

use std::io::Write;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use aifr_core::{ConversationState, InvocationArgs, Orchestrator, SessionStore, TurnOutcome};
use aifr_model::{catalog, registry};
use cli::{Cli, IsTerminal};

/// Exit code for SIGINT, by shell convention 128 + signal number.
const EXIT_INTERRUPTED: i32 = 130;
/// Exit code for a missing prompt on non-interactive stdin; clap uses the
/// same code for its own parse errors.
const EXIT_USAGE: i32 = 2;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("aifr: {e:#}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    // Flags that answer without config or network.
    if let Some(shell) = cli.completions {
        cli::print_completions(shell);
        return Ok(0);
    }
    if cli.version {
        print_version();
        return Ok(0);
    }

    let config = aifr_config::load(cli.config.as_deref())?;

    if cli.list_models {
        let provider = resolved_provider(&config);
        print_models(&provider);
        return Ok(0);
    }

    let store = SessionStore::at_default_location(cli.session.as_deref());

    if cli.reset {
        store.clear()?;
        return Ok(0);
    }

    let mut state = store.load();
    let orchestrator = Orchestrator::new(config, store, |cfg, provider, model| {
        aifr_model::from_config(cfg, provider, model)
    });

    let stdin_is_tty = std::io::stdin().is_terminal();

    match cli.effective_prompt() {
        Some(prompt) => {
            let stdin = if stdin_is_tty {
                None
            } else {
                Some(aifr_input::drain_stdin().await?)
            };
            let args = invocation_args(&cli, prompt.to_string(), stdin);
            run_one_shot(&orchestrator, &mut state, &args, &cli).await
        }
        None if stdin_is_tty => run_interactive(&orchestrator, &mut state, &cli).await,
        None => {
            eprintln!("aifr: no prompt given (and stdin is not a terminal); see --help");
            Ok(EXIT_USAGE)
        }
    }
}

fn invocation_args(cli: &Cli, prompt: String, stdin: Option<String>) -> InvocationArgs {
    InvocationArgs {
        prompt,
        file_paths: cli.file.clone(),
        console_cmd: cli.console.clone(),
        stdin: stdin.filter(|s| !s.is_empty()),
        explicit_model: cli.model.clone(),
        agent_override: cli.agent.clone(),
        context_limit_override: cli.context_limit,
    }
}

async fn run_one_shot<F>(
    orchestrator: &Orchestrator<F>,
    state: &mut ConversationState,
    args: &InvocationArgs,
    cli: &Cli,
) -> anyhow::Result<i32>
where
    F: Fn(
        &aifr_config::Config,
        &str,
        &str,
    ) -> Result<Box<dyn aifr_model::Provider>, aifr_model::ModelError>,
{
    // SIGINT while the call is in flight cancels it; the in-flight user
    // turn is never persisted because append runs after the response.
    let outcome = tokio::select! {
        outcome = orchestrator.run_turn(state, args) => outcome?,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("aifr: interrupted");
            return Ok(EXIT_INTERRUPTED);
        }
    };

    emit(&outcome, cli)?;
    Ok(0)
}

/// Line loop over a terminal stdin. Each line is classified, dispatched,
/// and persisted like a standalone invocation; the session carries across
/// lines and across processes.
async fn run_interactive<F>(
    orchestrator: &Orchestrator<F>,
    state: &mut ConversationState,
    cli: &Cli,
) -> anyhow::Result<i32>
where
    F: Fn(
        &aifr_config::Config,
        &str,
        &str,
    ) -> Result<Box<dyn aifr_model::Provider>, aifr_model::ModelError>,
{
    use tokio::io::{AsyncBufReadExt, BufReader};

    eprintln!(
        "aifr {} interactive (exit/quit or Ctrl-D to leave)",
        env!("CARGO_PKG_VERSION")
    );
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        eprint!("aifr> ");
        std::io::stderr().flush().ok();

        let line = tokio::select! {
            line = lines.next_line() => line.context("reading stdin")?,
            // SIGINT between turns returns to the prompt.
            _ = tokio::signal::ctrl_c() => {
                eprintln!();
                continue;
            }
        };

        let Some(line) = line else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        let args = invocation_args(cli, line.to_string(), None);
        let outcome = tokio::select! {
            outcome = orchestrator.run_turn(state, &args) => outcome,
            _ = tokio::signal::ctrl_c() => {
                eprintln!("aifr: interrupted");
                return Ok(EXIT_INTERRUPTED);
            }
        };

        match outcome {
            Ok(o) => emit(&o, cli)?,
            // One failed turn does not end the conversation.
            Err(e) => eprintln!("aifr: {e:#}"),
        }
    }

    Ok(0)
}

/// Print one turn's result: optional stats line to stderr, response to
/// stdout (colorized only on a TTY without --raw).
fn emit(outcome: &TurnOutcome, cli: &Cli) -> anyhow::Result<()> {
    if cli.stats {
        let t = |v: Option<u32>| v.map(|n| n.to_string()).unwrap_or_else(|| "?".into());
        eprintln!(
            "[Agent: {} | Model: {} | Tokens: {}/{}/{}]",
            outcome.agent,
            outcome.response.model_used,
            t(outcome.response.prompt_tokens),
            t(outcome.response.completion_tokens),
            t(outcome.response.total_tokens),
        );
    }

    let stdout = std::io::stdout();
    let colorize = stdout.is_terminal() && !cli.raw;
    let text = if colorize {
        aifr_render::render(&outcome.response.content)
    } else {
        outcome.response.content.clone()
    };

    let mut lock = stdout.lock();
    aifr_render::write_response(&mut lock, &text).context("writing response")?;
    Ok(())
}

fn resolved_provider(config: &aifr_config::Config) -> String {
    config
        .provider
        .as_deref()
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| registry::detect_provider_from_env().to_string())
}

fn print_version() {
    let version = env!("CARGO_PKG_VERSION");
    if std::io::stdout().is_terminal() {
        print!("{}", aifr_render::banner(version));
    } else {
        println!("aifr {version}");
    }
}

fn print_models(provider: &str) {
    let entries = catalog::for_provider(provider);
    if entries.is_empty() {
        println!(
            "no catalog entries for provider '{provider}' (models are defined by your instance)"
        );
        return;
    }
    println!("{:<32} {:>10}  {}", "MODEL", "CONTEXT", "ROUTED FOR");
    for e in entries {
        println!("{:<32} {:>10}  {}", e.id, e.context_window, e.routed_for);
    }
}

fn init_logging(verbosity: u8) {
    // stdout is reserved for model output; all diagnostics go to stderr.
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

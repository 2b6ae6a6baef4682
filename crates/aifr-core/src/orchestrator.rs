// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! The single-pass request pipeline.
//!
//! One invocation: gather attachments, compose the user message, classify,
//! assemble the windowed conversation, select a model, call the provider
//! (retrying once on context overflow when the model was auto-selected),
//! then persist the completed turn.

use anyhow::Context;
use tracing::{debug, warn};

use aifr_config::Config;
use aifr_model::{envelope, registry, CompletionRequest, LlmResponse, Message, ModelError, Provider};

use crate::agent::{self, AgentKind, ClassifyInput};
use crate::context;
use crate::selector::{self, SelectionInput, ESCALATION_MODEL};
use crate::session::{ConversationState, SessionStore};

/// Inputs for one turn, already parsed from the CLI.
///
/// `stdin` is drained by the caller because only the caller knows whether
/// stdin is a terminal; in interactive mode it stays `None`.
#[derive(Debug, Default)]
pub struct InvocationArgs {
    pub prompt: String,
    pub file_paths: Vec<String>,
    pub console_cmd: Option<String>,
    pub stdin: Option<String>,
    pub explicit_model: Option<String>,
    pub agent_override: Option<String>,
    pub context_limit_override: Option<usize>,
}

/// What one successful turn produced, for rendering and `--stats`.
#[derive(Debug)]
pub struct TurnOutcome {
    pub response: LlmResponse,
    pub agent: AgentKind,
    pub provider: String,
}

/// The per-invocation pipeline.
///
/// Generic over the provider factory so tests can substitute recorded
/// backends; production wires in [`aifr_model::from_config`].
pub struct Orchestrator<F>
where
    F: Fn(&Config, &str, &str) -> Result<Box<dyn Provider>, ModelError>,
{
    config: Config,
    store: SessionStore,
    build_provider: F,
}

impl<F> Orchestrator<F>
where
    F: Fn(&Config, &str, &str) -> Result<Box<dyn Provider>, ModelError>,
{
    pub fn new(config: Config, store: SessionStore, build_provider: F) -> Self {
        Self {
            config,
            store,
            build_provider,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Run one turn against the given conversation state.
    ///
    /// On success the state has the new user+assistant pair appended and
    /// persisted. On any error the state and the session file are left
    /// untouched; a dangling user turn is never written.
    pub async fn run_turn(
        &self,
        state: &mut ConversationState,
        args: &InvocationArgs,
    ) -> anyhow::Result<TurnOutcome> {
        // Attachments first: a sensitive-file refusal must abort before
        // any remote traffic.
        let mut file_contents: Vec<String> = Vec::new();
        let mut file_bytes: u64 = 0;
        for path in &args.file_paths {
            let loaded = aifr_input::load_file(path, self.config.file_timeout_secs).await?;
            file_bytes += loaded.size;
            file_contents.push(loaded.content);
        }

        let console = match &args.console_cmd {
            Some(cmd) => {
                let capture =
                    aifr_input::capture_command(cmd, self.config.command_timeout_secs).await?;
                debug!(exit = capture.exit_status, bytes = capture.output.len(), "captured command output");
                Some(capture)
            }
            None => None,
        };

        let stdin_is_stderr = args
            .stdin
            .as_deref()
            .map(aifr_input::looks_like_stderr)
            .unwrap_or(false);

        let user_content = envelope::build_user_message(
            &args.prompt,
            &file_contents,
            console.as_ref().map(|c| c.output.as_str()),
            args.stdin.as_deref(),
        );

        let classification = agent::classify(
            &ClassifyInput {
                prompt: &args.prompt,
                has_file: !file_contents.is_empty(),
                file_bytes,
                has_console: console.is_some(),
                stdin_looks_like_stderr: stdin_is_stderr,
            },
            args.agent_override.as_deref(),
            &self.config.custom_agents,
        )?;

        // Provider ids are matched case-insensitively everywhere; normalize
        // once so config values like "Sherlock" route correctly.
        let mut provider_id = self
            .config
            .provider
            .as_deref()
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| registry::detect_provider_from_env().to_string());

        let context_limit = args
            .context_limit_override
            .unwrap_or(self.config.context_limit);

        let composed = context::build_messages(
            &classification.system_prompt,
            &state.messages,
            Message::user(user_content.clone()),
            self.config.max_turns,
            context_limit,
        );

        let selection = selector::select(&SelectionInput {
            prompt: &args.prompt,
            explicit_model: args.explicit_model.as_deref(),
            agent_model: classification.model_override.as_deref(),
            estimated_tokens: composed.estimated_tokens,
            context_limit,
            provider: &provider_id,
            aliases: &self.config.model_aliases,
            model_default: self.config.model_default.as_deref(),
        })?;

        if let Some(p) = &selection.provider_override {
            provider_id = p.to_ascii_lowercase();
        }
        if selection.over_limit_warning {
            eprintln!(
                "aifr: estimated {} tokens exceed the context limit of {}; keeping explicitly selected model {}",
                composed.estimated_tokens, context_limit, selection.model
            );
        }

        debug!(
            agent = %classification.kind,
            provider = %provider_id,
            model = %selection.model,
            messages = composed.messages.len(),
            tokens = composed.estimated_tokens,
            "dispatching"
        );

        let request = CompletionRequest::new(composed.messages);
        let provider = (self.build_provider)(&self.config, &provider_id, &selection.model)?;

        let response = match provider.complete(request.clone()).await {
            Ok(r) => r,
            Err(e) if e.is_context_length() && !selection.explicit && selection.model != ESCALATION_MODEL => {
                warn!(model = %selection.model, "context window exceeded, retrying with {ESCALATION_MODEL}");
                let retry =
                    (self.build_provider)(&self.config, &provider_id, ESCALATION_MODEL)?;
                retry.complete(request).await?
            }
            Err(e) => return Err(e.into()),
        };

        self.store
            .append(
                state,
                Message::user(user_content),
                Message::assistant(response.content.clone()),
            )
            .context("persisting session")?;

        Ok(TurnOutcome {
            response,
            agent: classification.kind,
            provider: provider_id,
        })
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use aifr_model::{RecordingProvider, Role, Scripted};
    use crate::selector::{MODEL_ANALYSIS, MODEL_FALLBACK};

    fn test_config() -> Config {
        Config {
            provider: Some("sherlock".into()),
            api_key: Some("test-key".into()),
            ..Default::default()
        }
    }

    fn orchestrator_with(
        dir: &tempfile::TempDir,
        mock: RecordingProvider,
        config: Config,
    ) -> Orchestrator<impl Fn(&Config, &str, &str) -> Result<Box<dyn Provider>, ModelError>> {
        let store = SessionStore::new(dir.path().join("session.json"));
        Orchestrator::new(config, store, move |_cfg, _provider, model| {
            Ok(Box::new(mock.with_model(model)) as Box<dyn Provider>)
        })
    }

    fn args(prompt: &str) -> InvocationArgs {
        InvocationArgs {
            prompt: prompt.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn fresh_turn_composes_system_plus_user() {
        let dir = tempfile::tempdir().unwrap();
        let mock = RecordingProvider::always_text("m", "4");
        let orch = orchestrator_with(&dir, mock.clone(), test_config());
        let mut state = ConversationState::empty();

        let outcome = orch.run_turn(&mut state, &args("What is 2+2?")).await.unwrap();
        assert_eq!(outcome.agent, AgentKind::Default);
        assert_eq!(outcome.response.model_used, MODEL_FALLBACK);

        let reqs = mock.requests.lock().unwrap();
        assert_eq!(reqs.len(), 1);
        let msgs = &reqs[0].messages;
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, Role::System);
        assert_eq!(msgs[1].content, "What is 2+2?");
    }

    #[tokio::test]
    async fn successful_turn_persists_both_messages() {
        let dir = tempfile::tempdir().unwrap();
        let mock = RecordingProvider::always_text("m", "the answer");
        let orch = orchestrator_with(&dir, mock, test_config());
        let mut state = ConversationState::empty();

        orch.run_turn(&mut state, &args("hello")).await.unwrap();

        let loaded = orch.store().load();
        assert_eq!(loaded.messages.len(), 2);
        assert_eq!(loaded.messages[0].content, "hello");
        assert_eq!(loaded.messages[1].content, "the answer");
    }

    #[tokio::test]
    async fn failed_call_leaves_session_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mock = RecordingProvider::new("m", vec![Scripted::ApiError(500)]);
        let orch = orchestrator_with(&dir, mock, test_config());
        let mut state = ConversationState::empty();

        assert!(orch.run_turn(&mut state, &args("hello")).await.is_err());
        assert!(state.messages.is_empty());
        assert!(orch.store().load().messages.is_empty());
    }

    #[tokio::test]
    async fn context_overflow_retries_once_with_escalation_model() {
        let dir = tempfile::tempdir().unwrap();
        let mock = RecordingProvider::new(
            "m",
            vec![Scripted::ContextLength, Scripted::Text("recovered".into())],
        );
        let orch = orchestrator_with(&dir, mock.clone(), test_config());
        let mut state = ConversationState::empty();

        let outcome = orch.run_turn(&mut state, &args("hello")).await.unwrap();
        assert_eq!(outcome.response.model_used, ESCALATION_MODEL);
        assert_eq!(outcome.response.content, "recovered");
        assert_eq!(mock.requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn context_overflow_with_explicit_model_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mock = RecordingProvider::new("m", vec![Scripted::ContextLength]);
        let orch = orchestrator_with(&dir, mock.clone(), test_config());
        let mut state = ConversationState::empty();

        let mut a = args("hello");
        a.explicit_model = Some("Llama-3.1-8B-Instruct".into());
        assert!(orch.run_turn(&mut state, &a).await.is_err());
        // No retry happened.
        assert_eq!(mock.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn console_capture_routes_to_debugger_and_deepseek() {
        let dir = tempfile::tempdir().unwrap();
        let mock = RecordingProvider::always_text("m", "diagnosis");
        let orch = orchestrator_with(&dir, mock.clone(), test_config());
        let mut state = ConversationState::empty();

        let mut a = args("Why does this fail?");
        a.console_cmd = Some("echo 'FAILED test_x.py::test_a'".into());
        let outcome = orch.run_turn(&mut state, &a).await.unwrap();

        assert_eq!(outcome.agent, AgentKind::Debugger);
        assert_eq!(outcome.response.model_used, MODEL_ANALYSIS);

        let reqs = mock.requests.lock().unwrap();
        let user = reqs[0].messages.last().unwrap();
        assert!(user.content.contains(
            "===CONSOLE_START===\nFAILED test_x.py::test_a\n===CONSOLE_END==="
        ));
    }

    #[tokio::test]
    async fn sensitive_file_aborts_before_any_call() {
        let dir = tempfile::tempdir().unwrap();
        let mock = RecordingProvider::always_text("m", "never");
        let orch = orchestrator_with(&dir, mock.clone(), test_config());
        let mut state = ConversationState::empty();

        let mut a = args("Read this");
        a.file_paths = vec!["~/.ssh/id_rsa".into()];
        let err = orch.run_turn(&mut state, &a).await.unwrap_err();

        assert!(format!("{err:#}").contains("sensitive"));
        assert!(mock.requests.lock().unwrap().is_empty(), "no HTTP call issued");
        assert!(orch.store().load().messages.is_empty());
    }

    #[tokio::test]
    async fn stdin_envelope_is_appended_last() {
        let dir = tempfile::tempdir().unwrap();
        let mock = RecordingProvider::always_text("m", "done");
        let orch = orchestrator_with(&dir, mock.clone(), test_config());
        let mut state = ConversationState::empty();

        let mut a = args("Translate");
        a.stdin = Some("line1\nline2\n".into());
        orch.run_turn(&mut state, &a).await.unwrap();

        let reqs = mock.requests.lock().unwrap();
        let user = reqs[0].messages.last().unwrap();
        assert!(user
            .content
            .ends_with("===STDIN_START===\nline1\nline2\n===STDIN_END==="));
    }

    #[tokio::test]
    async fn second_turn_carries_prior_history() {
        let dir = tempfile::tempdir().unwrap();
        let mock = RecordingProvider::new(
            "m",
            vec![Scripted::Text("first".into()), Scripted::Text("second".into())],
        );
        let orch = orchestrator_with(&dir, mock.clone(), test_config());
        let mut state = ConversationState::empty();

        orch.run_turn(&mut state, &args("one")).await.unwrap();
        orch.run_turn(&mut state, &args("two")).await.unwrap();

        let reqs = mock.requests.lock().unwrap();
        let msgs = &reqs[1].messages;
        // system, user "one", assistant "first", user "two"
        assert_eq!(msgs.len(), 4);
        assert_eq!(msgs[1].content, "one");
        assert_eq!(msgs[2].content, "first");
        assert_eq!(msgs[3].content, "two");
    }

    #[tokio::test]
    async fn unknown_agent_override_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let mock = RecordingProvider::always_text("m", "x");
        let orch = orchestrator_with(&dir, mock.clone(), test_config());
        let mut state = ConversationState::empty();

        let mut a = args("hi");
        a.agent_override = Some("ghost".into());
        let err = orch.run_turn(&mut state, &a).await.unwrap_err();
        assert!(format!("{err:#}").contains("ghost"));
        assert!(mock.requests.lock().unwrap().is_empty());
    }
}

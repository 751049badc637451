//! Handlers for each Claude Code hook event the gate takes part in.
//!
//! Each handler takes its collaborators explicitly, so the binary only has
//! to read stdin, resolve paths and map results to exit codes.

use std::ffi::OsStr;
use std::path::Path;

use log::{info, warn};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::config::{ConfigProvider, PolicyConfig};
use crate::error::GateError;
use crate::eval::{Gate, ToolInvocation, UNLOCK_COMMAND, Verdict};
use crate::logging;
use crate::mode::{FileModeStore, Mode, ModeStore};
use crate::paths::ProjectPaths;

/// Session flag files that must not survive into a new session.
const STALE_SESSION_FLAGS: &[&str] = &["context-warning-75.flag", "context-warning-90.flag"];

/// PreToolUse: decide one tool call.
pub fn pre_tool_use<C, M>(gate: &Gate<C, M>, input: &str) -> Result<Verdict, GateError>
where
    C: ConfigProvider,
    M: ModeStore,
{
    let invocation = ToolInvocation::from_json(input)?;
    let verdict = gate.check(&invocation);
    logging::log_decision(&invocation, &verdict);
    Ok(verdict)
}

/// Stop: an implementation step finished, so fall back to discussion.
/// Returns true if the mode changed.
pub fn stop(store: &impl ModeStore) -> Result<bool, GateError> {
    if store.get().is_discussion() {
        return Ok(false);
    }
    store.set(Mode::Discussion)?;
    info!("implementation step complete, reverted to discussion mode");
    Ok(true)
}

#[derive(Deserialize)]
struct PromptInput {
    prompt: Option<String>,
}

/// Case-insensitive search for any configured trigger phrase.
pub fn contains_trigger_phrase(prompt: &str, config: &PolicyConfig) -> bool {
    let prompt = prompt.to_lowercase();
    config
        .trigger_phrases
        .iter()
        .map(|phrase| phrase.trim().to_lowercase())
        .any(|phrase| !phrase.is_empty() && prompt.contains(&phrase))
}

/// UserPromptSubmit: a trigger phrase from the user grants alignment.
///
/// Returns the hook output to print when the mode was unlocked.
pub fn user_prompt(
    input: &str,
    config: &PolicyConfig,
    store: &impl ModeStore,
) -> Result<Option<Value>, GateError> {
    let parsed: PromptInput = serde_json::from_str(input)?;
    let prompt = parsed.prompt.ok_or(GateError::MissingField("prompt"))?;

    if !store.get().is_discussion() || !contains_trigger_phrase(&prompt, config) {
        return Ok(None);
    }
    store.set(Mode::Implementation)?;
    info!("trigger phrase received, switched to implementation mode");

    Ok(Some(json!({
        "hookSpecificOutput": {
            "hookEventName": "UserPromptSubmit",
            "additionalContext": "[DAIC: Implementation Mode Activated] The user has approved the \
                proposed work. You may now use editing tools. Return to discussion once the \
                agreed changes are done.",
        }
    })))
}

/// True if an executable named `name` is on `path_var` (a `PATH` value).
pub fn command_on_path(name: &str, path_var: Option<&OsStr>) -> bool {
    let Some(path_var) = path_var else {
        return false;
    };
    let candidates: Vec<String> = if cfg!(windows) {
        ["cmd", "ps1", "exe"]
            .iter()
            .map(|ext| format!("{name}.{ext}"))
            .chain(std::iter::once(name.to_string()))
            .collect()
    } else {
        vec![name.to_string()]
    };
    std::env::split_paths(path_var)
        .any(|dir| candidates.iter().any(|c| dir.join(c).is_file()))
}

fn clear_stale_flags(state_dir: &Path) {
    for flag in STALE_SESSION_FLAGS {
        match std::fs::remove_file(state_dir.join(flag)) {
            Ok(()) => info!("cleared {flag}"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("cannot clear {flag}: {e}"),
        }
    }
}

/// SessionStart: make sure the mode file exists, drop stale flags, and
/// tell the agent about missing setup.
///
/// `unlock_installed` reports whether the operator's unlock command is on
/// `PATH`. Never fails: setup problems are reported in the output instead.
pub fn session_start(paths: &ProjectPaths, config: &PolicyConfig, unlock_installed: bool) -> Value {
    let store = FileModeStore::new(&paths.state_file);
    match store.ensure_initialized() {
        Ok(true) => info!("initialized mode state at {}", paths.state_file.display()),
        Ok(false) => {}
        Err(e) => warn!("{e}"),
    }
    clear_stale_flags(paths.state_dir());

    let mut missing = Vec::new();
    if !unlock_installed {
        missing.push(format!("{UNLOCK_COMMAND} command"));
    }

    let context = if missing.is_empty() {
        String::new()
    } else {
        format!(
            "You are beginning a new context window with {name}.\n\n\
             [Setup Required]\n\
             Missing components: {missing}\n\n\
             To complete setup:\n\
             1. Run the cc-sessions installer\n\
             2. Ensure the {UNLOCK_COMMAND} command is in your PATH\n\n\
             The sessions system helps manage discussion/implementation workflow discipline.\n",
            name = config.developer_name(),
            missing = missing.join(", "),
        )
    };

    json!({
        "hookSpecificOutput": {
            "hookEventName": "SessionStart",
            "additionalContext": context,
        }
    })
}

/// What the operator asked the mode command to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeAction {
    Show,
    Toggle,
    Set(Mode),
}

impl ModeAction {
    pub fn parse(arg: Option<&str>) -> Result<Self, GateError> {
        match arg {
            None => Ok(ModeAction::Show),
            Some(arg) if arg.trim().eq_ignore_ascii_case("toggle") => Ok(ModeAction::Toggle),
            Some(other) => other.parse().map(ModeAction::Set),
        }
    }
}

/// The operator's unlock/lock command. Returns the resulting mode.
pub fn mode_command(store: &impl ModeStore, action: ModeAction) -> Result<Mode, GateError> {
    let target = match action {
        ModeAction::Show => return Ok(store.get()),
        ModeAction::Toggle => store.get().toggled(),
        ModeAction::Set(mode) => mode,
    };
    store.set(target)?;
    info!("mode set to {target} by operator");
    Ok(target)
}

/// Banner printed by the mode command.
pub fn mode_banner(mode: Mode) -> &'static str {
    match mode {
        Mode::Discussion => {
            "[DAIC: Discussion Mode] Propose changes and wait for approval before editing."
        }
        Mode::Implementation => {
            "[DAIC: Implementation Mode Activated] Editing tools are unlocked until the work is done."
        }
    }
}

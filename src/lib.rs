//! daic-gate: Claude Code hooks enforcing a discussion/implementation workflow.
//!
//! In *discussion* mode the agent may read and plan but not mutate; an
//! explicit approval from the user switches to *implementation* mode, and
//! finishing the work switches back. The PreToolUse gate decides each tool
//! call with [`eval::evaluate`], a pure function of the call, the current
//! [`mode::Mode`] and the [`config::PolicyConfig`].
//!
//! # Architecture
//!
//! - **[`parse`]** — Quote-aware splitting of shell command lines, substitution extraction, redirection detection.
//! - **[`classify`]** — Read-only vs mutating shell commands: deny-by-pattern, then allow-by-prefix.
//! - **[`eval`]** — Tool invocations, verdicts, the decision sequence and the [`eval::Gate`].
//! - **[`config`]** — Policy configuration: embedded defaults + `sessions-config.json` overlay.
//! - **[`mode`]** — The persisted mode and its atomic file store.
//! - **[`hooks`]** — Handlers for PreToolUse, Stop, SessionStart, UserPromptSubmit and the mode command.
//! - **[`paths`]** — Project root and shared file discovery.
//! - **[`logging`]** — Decision log through `log` + `simplelog`.

/// Shell command classification strategies.
pub mod classify;
/// Policy configuration types, defaults, and providers.
pub mod config;
/// Fatal boundary errors.
pub mod error;
/// Evaluation engine: invocation context, verdicts, decision sequence.
pub mod eval;
/// Hook event handlers.
pub mod hooks;
/// File-based decision logging.
pub mod logging;
/// Workflow mode and its persistence.
pub mod mode;
/// Project path discovery.
pub mod paths;
/// Shell command line decomposition.
pub mod parse;

pub use error::GateError;

use config::PolicyConfig;
use eval::{ToolInvocation, Verdict};
use mode::Mode;

/// Evaluate a tool call under the built-in default policy.
///
/// This is the main entry point for tests and simple embedding. The hook
/// binary goes through [`eval::Gate`] with file-backed providers instead.
pub fn evaluate(invocation: &ToolInvocation, mode: Mode) -> Verdict {
    eval::evaluate(invocation, mode, &PolicyConfig::default_config())
}

/// Whether `command` is read-only under the built-in default policy.
pub fn is_read_only(command: &str) -> bool {
    classify::is_read_only(command, &PolicyConfig::default_config())
}

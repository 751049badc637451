use std::path::PathBuf;

use log::{LevelFilter, info};
use simplelog::{ConfigBuilder, WriteLogger};

use crate::eval::{ToolInvocation, Verdict};
use crate::paths::expand_path;

/// Log file override; `off` disables logging.
pub const LOG_ENV: &str = "DAIC_LOG";
/// Level filter (`error` .. `trace`), default `info`.
pub const LOG_LEVEL_ENV: &str = "DAIC_LOG_LEVEL";

/// Resolve the log file: `$DAIC_LOG`, else `~/.local/share/daic-gate/gate.log`.
fn log_path() -> Option<PathBuf> {
    match std::env::var(LOG_ENV) {
        Ok(v) if v.eq_ignore_ascii_case("off") => None,
        Ok(v) if !v.trim().is_empty() => expand_path(&v),
        _ => {
            let home = std::env::var_os("HOME")?;
            Some(PathBuf::from(home).join(".local/share/daic-gate/gate.log"))
        }
    }
}

fn level() -> LevelFilter {
    std::env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(LevelFilter::Info)
}

/// Install the file logger. Best-effort: any failure leaves logging off,
/// since logging must never block the hook.
pub fn init() {
    let Some(path) = log_path() else {
        return;
    };
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
    else {
        return;
    };
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();
    let _ = WriteLogger::init(level(), config, file);
}

/// Compact one-line description of what the tool call would do.
fn describe(invocation: &ToolInvocation) -> String {
    match invocation.shell_command() {
        Some(command) => command
            .chars()
            .take(200)
            .collect::<String>()
            .replace('\n', "\\n"),
        None => serde_json::Value::Object(invocation.tool_input.clone())
            .to_string()
            .chars()
            .take(200)
            .collect(),
    }
}

/// Record one decision as a tab-separated line.
pub fn log_decision(invocation: &ToolInvocation, verdict: &Verdict) {
    info!(
        "{}\t{}\t{}\t{}",
        verdict.label(),
        invocation.tool_name,
        describe(invocation),
        verdict.reason.replace('\n', "; "),
    );
}

//! daic-gate: Claude Code hook binary.
//!
//! Reads the hook payload from stdin. Subcommands:
//!
//!   (none) | pre-tool-use   PreToolUse gate: exit 0 to allow, 2 to block
//!   stop                    Stop hook: revert to discussion mode
//!   session-start           SessionStart hook: initialize state, report setup
//!   user-prompt             UserPromptSubmit hook: unlock on a trigger phrase
//!   mode [discussion|implementation|toggle]
//!                           Show or change the mode (operator only)
//!   --dump-config           Print the effective policy as JSON

use std::io::Read;
use std::process::ExitCode;

use daic_gate::GateError;
use daic_gate::config::{ConfigProvider, FileConfigProvider};
use daic_gate::eval::Gate;
use daic_gate::hooks::{self, ModeAction};
use daic_gate::mode::FileModeStore;
use daic_gate::paths::ProjectPaths;

const USAGE: &str = "usage: daic-gate [pre-tool-use | stop | session-start | user-prompt | \
                     mode [discussion|implementation|toggle] | --dump-config]";

fn read_stdin() -> Result<String, GateError> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    Ok(input)
}

fn run_pre_tool_use(paths: &ProjectPaths) -> Result<ExitCode, GateError> {
    let gate = Gate::new(
        FileConfigProvider::new(&paths.config_file),
        FileModeStore::new(&paths.state_file),
    );
    let verdict = hooks::pre_tool_use(&gate, &read_stdin()?)?;
    if let Some(message) = &verdict.message {
        eprintln!("{message}");
    }
    Ok(ExitCode::from(u8::try_from(verdict.exit_code).unwrap_or(1)))
}

fn run_stop(paths: &ProjectPaths) -> Result<ExitCode, GateError> {
    // The payload carries nothing the revert needs.
    let _ = read_stdin();
    hooks::stop(&FileModeStore::new(&paths.state_file))?;
    Ok(ExitCode::SUCCESS)
}

fn run_session_start(paths: &ProjectPaths) -> Result<ExitCode, GateError> {
    let _ = read_stdin();
    let config = FileConfigProvider::new(&paths.config_file).load();
    let path_var = std::env::var_os("PATH");
    let installed = hooks::command_on_path(daic_gate::eval::UNLOCK_COMMAND, path_var.as_deref());
    println!("{}", hooks::session_start(paths, &config, installed));
    Ok(ExitCode::SUCCESS)
}

fn run_user_prompt(paths: &ProjectPaths) -> Result<ExitCode, GateError> {
    let config = FileConfigProvider::new(&paths.config_file).load();
    let store = FileModeStore::new(&paths.state_file);
    if let Some(output) = hooks::user_prompt(&read_stdin()?, &config, &store)? {
        println!("{output}");
    }
    Ok(ExitCode::SUCCESS)
}

fn run_mode(paths: &ProjectPaths, arg: Option<&str>) -> Result<ExitCode, GateError> {
    let action = ModeAction::parse(arg)?;
    let mode = hooks::mode_command(&FileModeStore::new(&paths.state_file), action)?;
    println!("{}", hooks::mode_banner(mode));
    Ok(ExitCode::SUCCESS)
}

fn run_dump_config(paths: &ProjectPaths) -> Result<ExitCode, GateError> {
    let config = FileConfigProvider::new(&paths.config_file).load();
    let dump = serde_json::to_string_pretty(&config).map_err(std::io::Error::other)?;
    println!("{dump}");
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    daic_gate::logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let paths = ProjectPaths::discover();

    let result = match args.first().map(String::as_str) {
        None | Some("pre-tool-use") => run_pre_tool_use(&paths),
        Some("stop") => run_stop(&paths),
        Some("session-start") => run_session_start(&paths),
        Some("user-prompt") => run_user_prompt(&paths),
        Some("mode") => run_mode(&paths, args.get(1).map(String::as_str)),
        Some("--dump-config") => run_dump_config(&paths),
        Some("-h" | "--help") => {
            println!("{USAGE}");
            Ok(ExitCode::SUCCESS)
        }
        Some(other) => {
            eprintln!("daic-gate: unknown command `{other}`\n{USAGE}");
            Ok(ExitCode::from(1))
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e}");
            eprintln!("daic-gate: fatal: {e}");
            ExitCode::from(1)
        }
    }
}

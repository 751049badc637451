pub mod context;
pub mod decision;

pub use context::{MCP_TOOL_PREFIX, SHELL_TOOLS, ToolInvocation};
pub use decision::{ALLOW_EXIT_CODE, BLOCK_EXIT_CODE, Verdict};

use log::debug;

use crate::classify::CommandClassifier;
use crate::config::{ConfigProvider, PolicyConfig};
use crate::mode::{Mode, ModeStore};

/// The operator's mode-switch command. The agent may not run it itself.
pub const UNLOCK_COMMAND: &str = "daic";

fn is_unlock_command(command: &str) -> bool {
    let command = command.trim();
    command == UNLOCK_COMMAND
        || command
            .strip_prefix(UNLOCK_COMMAND)
            .is_some_and(|rest| rest.starts_with(' '))
}

fn unlock_blocked_message() -> String {
    format!(
        "[DAIC: Command Blocked] The '{UNLOCK_COMMAND}' command is not allowed in discussion mode.\n\
         You're already in discussion mode. Be sure to propose your intended edits/plans to the user \
         and seek their explicit approval, which will unlock implementation mode."
    )
}

fn tool_blocked_message(tool_name: &str) -> String {
    format!(
        "[DAIC: Tool Blocked] You're in discussion mode. The {tool_name} tool is not allowed. \
         You need to seek alignment first."
    )
}

fn mcp_blocked_message(tool_name: &str) -> String {
    format!(
        "[DAIC: MCP Tool Blocked] You're in discussion mode. The {tool_name} tool appears to modify \
         files and is not allowed.\n\
         Detected file modification pattern in MCP tool. Seek user alignment first."
    )
}

/// Decide one tool call. Pure: the same inputs always give the same verdict.
///
/// In order, first match wins:
/// 1. a read-only shell command is allowed in any mode;
/// 2. in discussion mode, the unlock command is blocked;
/// 3. in discussion mode, a blocked tool is blocked;
/// 4. in discussion mode, a namespaced tool whose method name contains a
///    mutation token is blocked (when MCP blocking is enabled);
/// 5. anything else is allowed.
pub fn evaluate(invocation: &ToolInvocation, mode: Mode, config: &PolicyConfig) -> Verdict {
    let tool = invocation.tool_name.as_str();

    let shell_finding = invocation.shell_command().map(|command| {
        let finding = CommandClassifier::from_config(config).classify(command);
        (command, finding)
    });

    if let Some((_, finding)) = &shell_finding
        && finding.is_read_only()
    {
        return Verdict::allow(format!("read-only command: {}", finding.reason));
    }

    if !mode.is_discussion() {
        return Verdict::allow("implementation mode");
    }

    if let Some((command, _)) = &shell_finding
        && is_unlock_command(command)
    {
        return Verdict::block(
            unlock_blocked_message(),
            format!("'{UNLOCK_COMMAND}' run by the agent in discussion mode"),
        );
    }

    if config.is_blocked_tool(tool) {
        return Verdict::block(
            tool_blocked_message(tool),
            format!("{tool} is a blocked tool in discussion mode"),
        );
    }

    if config.mcp_blocking.enabled
        && let Some(method) = invocation.mcp_method()
    {
        debug!("checking MCP method {method:?} of {tool}");
        if let Some(token) = config
            .mcp_blocking
            .mutation_tokens
            .iter()
            .find(|token| method.contains(token.as_str()))
        {
            return Verdict::block(
                mcp_blocked_message(tool),
                format!("MCP method {method} contains mutation token {token:?}"),
            );
        }
    }

    match shell_finding {
        Some((_, finding)) => Verdict::allow(format!(
            "discussion mode, {tool} is not a blocked tool ({})",
            finding.reason
        )),
        None => Verdict::allow(format!("discussion mode, {tool} is not gated")),
    }
}

/// Wires a config source and a mode store to [`evaluate`].
///
/// Each [`check`](Gate::check) loads the config and reads the mode exactly
/// once, so a mode change by another process is seen by the next call.
pub struct Gate<C, M> {
    config: C,
    modes: M,
}

impl<C: ConfigProvider, M: ModeStore> Gate<C, M> {
    pub fn new(config: C, modes: M) -> Self {
        Self { config, modes }
    }

    pub fn check(&self, invocation: &ToolInvocation) -> Verdict {
        let config = self.config.load();
        let mode = self.modes.get();
        evaluate(invocation, mode, &config)
    }

    /// Current mode, as the next `check` would see it.
    pub fn mode(&self) -> Mode {
        self.modes.get()
    }

    pub fn config_provider(&self) -> &C {
        &self.config
    }

    pub fn mode_store(&self) -> &M {
        &self.modes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaticConfigProvider;
    use crate::mode::MemoryModeStore;

    fn eval(invocation: &ToolInvocation, mode: Mode) -> Verdict {
        evaluate(invocation, mode, &PolicyConfig::default_config())
    }

    #[test]
    fn read_only_shell_allowed_in_both_modes() {
        for mode in [Mode::Discussion, Mode::Implementation] {
            let v = eval(&ToolInvocation::shell("git status && ls"), mode);
            assert!(v.allow);
            assert_eq!(v.exit_code, 0);
            assert!(v.message.is_none());
        }
    }

    #[test]
    fn unlock_command_blocked_in_discussion() {
        for cmd in ["daic", "  daic  ", "daic implementation"] {
            let v = eval(&ToolInvocation::shell(cmd), Mode::Discussion);
            assert!(v.is_blocked(), "{cmd}");
            assert_eq!(v.exit_code, BLOCK_EXIT_CODE);
            let msg = v.message.unwrap();
            assert!(msg.starts_with("[DAIC: Command Blocked]"));
            assert_eq!(msg.lines().count(), 2);
        }
    }

    #[test]
    fn unlock_lookalikes_not_treated_as_unlock() {
        let v = eval(&ToolInvocation::shell("daicx"), Mode::Discussion);
        assert!(v.allow);
        let v = eval(&ToolInvocation::shell("./bin/daic"), Mode::Discussion);
        assert!(v.allow);
    }

    #[test]
    fn unlock_command_allowed_in_implementation() {
        let v = eval(&ToolInvocation::shell("daic"), Mode::Implementation);
        assert!(v.allow);
    }

    #[test]
    fn blocked_tools_in_discussion() {
        for tool in ["Edit", "Write", "MultiEdit", "NotebookEdit"] {
            let v = eval(&ToolInvocation::tool(tool), Mode::Discussion);
            assert!(v.is_blocked());
            assert_eq!(v.exit_code, 2);
            assert_eq!(
                v.message.unwrap(),
                format!(
                    "[DAIC: Tool Blocked] You're in discussion mode. The {tool} tool is not allowed. \
                     You need to seek alignment first."
                )
            );
        }
    }

    #[test]
    fn blocked_tools_allowed_in_implementation() {
        let v = eval(&ToolInvocation::tool("Write"), Mode::Implementation);
        assert!(v.allow);
        assert_eq!(v.exit_code, 0);
    }

    #[test]
    fn mcp_mutation_blocked() {
        let v = eval(&ToolInvocation::tool("mcp__fs__create_file"), Mode::Discussion);
        assert!(v.is_blocked());
        let msg = v.message.unwrap();
        assert!(msg.contains("mcp__fs__create_file"));
        assert_eq!(msg.lines().count(), 2);
    }

    #[test]
    fn mcp_read_allowed() {
        let v = eval(&ToolInvocation::tool("mcp__fs__list_files"), Mode::Discussion);
        assert!(v.allow);
    }

    #[test]
    fn mcp_token_is_substring_of_method_only() {
        // the server segment mentions "write" but the method does not
        let v = eval(&ToolInvocation::tool("mcp__writer__read_doc"), Mode::Discussion);
        assert!(v.allow);
        // "settings" contains "set"
        let v = eval(&ToolInvocation::tool("mcp__cfg__get_settings"), Mode::Discussion);
        assert!(v.is_blocked());
    }

    #[test]
    fn mcp_blocking_disabled() {
        let mut config = PolicyConfig::default_config();
        config.mcp_blocking.enabled = false;
        let v = evaluate(
            &ToolInvocation::tool("mcp__fs__delete_file"),
            Mode::Discussion,
            &config,
        );
        assert!(v.allow);
    }

    #[test]
    fn mcp_allowed_in_implementation() {
        let v = eval(&ToolInvocation::tool("mcp__fs__write_file"), Mode::Implementation);
        assert!(v.allow);
    }

    #[test]
    fn mutating_shell_not_blocked_by_default_tool_list() {
        let v = eval(&ToolInvocation::shell("rm -rf build"), Mode::Discussion);
        assert!(v.allow);
    }

    #[test]
    fn mutating_shell_blocked_when_bash_listed() {
        let mut config = PolicyConfig::default_config();
        config.blocked_tools.push("Bash".into());
        let v = evaluate(&ToolInvocation::shell("rm -rf build"), Mode::Discussion, &config);
        assert!(v.is_blocked());
        let v = evaluate(&ToolInvocation::shell("ls"), Mode::Discussion, &config);
        assert!(v.allow);
        let v = evaluate(
            &ToolInvocation::shell(r#"echo "$(ls > out.txt)""#),
            Mode::Discussion,
            &config,
        );
        assert!(v.is_blocked());
    }

    #[test]
    fn unrelated_tools_allowed() {
        for tool in ["Read", "Grep", "Glob", "WebFetch", "Task"] {
            assert!(eval(&ToolInvocation::tool(tool), Mode::Discussion).allow);
        }
    }

    #[test]
    fn gate_reads_mode_per_check() {
        let gate = Gate::new(
            StaticConfigProvider::default(),
            MemoryModeStore::default(),
        );
        let write = ToolInvocation::tool("Write");
        assert!(gate.check(&write).is_blocked());
        gate.mode_store().set(Mode::Implementation).unwrap();
        assert!(gate.check(&write).allow);
        assert_eq!(gate.mode(), Mode::Implementation);
    }
}

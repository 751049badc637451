use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::GateError;

/// Tools whose `tool_input.command` is run by a shell.
pub const SHELL_TOOLS: &[&str] = &["Bash"];

/// Name prefix of namespaced integration tools: `mcp__<server>__<method>`.
pub const MCP_TOOL_PREFIX: &str = "mcp__";
const MCP_SEPARATOR: &str = "__";

/// The hook payload as received; validated into a [`ToolInvocation`].
#[derive(Deserialize)]
struct HookInput {
    tool_name: Option<String>,
    tool_input: Option<Value>,
}

/// One pending tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub tool_name: String,
    pub tool_input: Map<String, Value>,
}

impl ToolInvocation {
    pub fn new(tool_name: impl Into<String>, tool_input: Map<String, Value>) -> Self {
        Self {
            tool_name: tool_name.into(),
            tool_input,
        }
    }

    /// A `Bash` call running `command`.
    pub fn shell(command: &str) -> Self {
        let mut input = Map::new();
        input.insert("command".into(), Value::String(command.into()));
        Self::new("Bash", input)
    }

    /// A call with an empty input object.
    pub fn tool(tool_name: impl Into<String>) -> Self {
        Self::new(tool_name, Map::new())
    }

    /// Parse and validate a PreToolUse payload.
    ///
    /// A payload without `tool_name`, without an object `tool_input`, or a
    /// shell call without a string `command` is a contract violation and is
    /// reported as an error rather than guessed at.
    pub fn from_json(input: &str) -> Result<Self, GateError> {
        let raw: HookInput = serde_json::from_str(input)?;

        let tool_name = raw
            .tool_name
            .filter(|name| !name.is_empty())
            .ok_or(GateError::MissingField("tool_name"))?;
        let Some(Value::Object(tool_input)) = raw.tool_input else {
            return Err(GateError::MissingField("tool_input"));
        };

        let invocation = Self::new(tool_name, tool_input);
        if invocation.is_shell() && invocation.command().is_none() {
            return Err(GateError::MissingField("tool_input.command"));
        }
        Ok(invocation)
    }

    pub fn is_shell(&self) -> bool {
        SHELL_TOOLS.contains(&self.tool_name.as_str())
    }

    /// `tool_input.command`, if it is a string.
    pub fn command(&self) -> Option<&str> {
        self.tool_input.get("command").and_then(Value::as_str)
    }

    /// The command text of a shell call; `None` for every other tool.
    pub fn shell_command(&self) -> Option<&str> {
        if self.is_shell() { self.command() } else { None }
    }

    /// Lower-cased method of a namespaced tool: the part after the last `__`.
    /// `None` unless the name carries the `mcp__` marker.
    pub fn mcp_method(&self) -> Option<String> {
        if !self.tool_name.starts_with(MCP_TOOL_PREFIX) {
            return None;
        }
        self.tool_name
            .rsplit(MCP_SEPARATOR)
            .next()
            .map(str::to_lowercase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_shell_payload() {
        let inv = ToolInvocation::from_json(
            r#"{"tool_name":"Bash","tool_input":{"command":"ls -la","description":"list"}}"#,
        )
        .unwrap();
        assert!(inv.is_shell());
        assert_eq!(inv.shell_command(), Some("ls -la"));
    }

    #[test]
    fn parses_other_tool_payload() {
        let inv = ToolInvocation::from_json(
            r#"{"session_id":"s","tool_name":"Edit","tool_input":{"file_path":"/a"}}"#,
        )
        .unwrap();
        assert_eq!(inv.tool_name, "Edit");
        assert!(!inv.is_shell());
        assert_eq!(inv.shell_command(), None);
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(
            ToolInvocation::from_json("{"),
            Err(GateError::MalformedInput(_))
        ));
    }

    #[test]
    fn rejects_missing_tool_name() {
        assert!(matches!(
            ToolInvocation::from_json(r#"{"tool_input":{}}"#),
            Err(GateError::MissingField("tool_name"))
        ));
        assert!(matches!(
            ToolInvocation::from_json(r#"{"tool_name":"","tool_input":{}}"#),
            Err(GateError::MissingField("tool_name"))
        ));
    }

    #[test]
    fn rejects_missing_or_non_object_input() {
        assert!(matches!(
            ToolInvocation::from_json(r#"{"tool_name":"Edit"}"#),
            Err(GateError::MissingField("tool_input"))
        ));
        assert!(matches!(
            ToolInvocation::from_json(r#"{"tool_name":"Edit","tool_input":"x"}"#),
            Err(GateError::MissingField("tool_input"))
        ));
    }

    #[test]
    fn rejects_shell_without_command() {
        assert!(matches!(
            ToolInvocation::from_json(r#"{"tool_name":"Bash","tool_input":{}}"#),
            Err(GateError::MissingField("tool_input.command"))
        ));
        assert!(matches!(
            ToolInvocation::from_json(r#"{"tool_name":"Bash","tool_input":{"command":7}}"#),
            Err(GateError::MissingField("tool_input.command"))
        ));
    }

    #[test]
    fn mcp_method_extraction() {
        assert_eq!(
            ToolInvocation::tool("mcp__filesystem__Create_File").mcp_method(),
            Some("create_file".into())
        );
        assert_eq!(
            ToolInvocation::tool("mcp__a__b__list_files").mcp_method(),
            Some("list_files".into())
        );
        assert_eq!(ToolInvocation::tool("Write").mcp_method(), None);
        assert_eq!(ToolInvocation::tool("my__create").mcp_method(), None);
    }

    #[test]
    fn bare_mcp_marker_has_empty_method() {
        assert_eq!(
            ToolInvocation::tool("mcp__").mcp_method(),
            Some(String::new())
        );
    }
}

use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.json");

/// Name used in the session-start banner when the config names nobody.
pub const DEFAULT_DEVELOPER_NAME: &str = "the developer";

// ── Effective config ──

/// Immutable policy snapshot for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PolicyConfig {
    /// Phrases in a user prompt that grant alignment and unlock implementation mode.
    pub trigger_phrases: Vec<String>,
    /// Tools refused outright in discussion mode.
    pub blocked_tools: Vec<String>,
    /// Command prefixes that mark a shell segment as read-only.
    #[serde(rename = "read_only_bash_commands")]
    pub read_only_prefixes: Vec<String>,
    pub mcp_blocking: McpBlocking,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer_name: Option<String>,
}

/// Name-based blocking of namespaced (`mcp__server__method`) tools.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct McpBlocking {
    pub enabled: bool,
    /// Substrings of a lower-cased method name that signal mutation.
    #[serde(rename = "patterns")]
    pub mutation_tokens: Vec<String>,
}

// ── Overlay (the user's sessions-config.json) ──

/// Every key is optional; an absent key keeps its default. Unknown keys
/// belong to other parts of the sessions tooling and are ignored.
#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    trigger_phrases: Option<Vec<String>>,
    blocked_tools: Option<Vec<String>>,
    read_only_bash_commands: Option<Vec<String>>,
    mcp_blocking: Option<McpBlockingOverlay>,
    developer_name: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct McpBlockingOverlay {
    enabled: Option<bool>,
    patterns: Option<Vec<String>>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

impl PolicyConfig {
    /// Load the embedded default configuration.
    pub fn default_config() -> Self {
        serde_json::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Build a config from a user JSON document layered over the defaults.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let overlay: ConfigOverlay = serde_json::from_str(content)?;
        let mut config = Self::default_config();
        config.apply_overlay(overlay);
        Ok(config)
    }

    /// Present keys replace their defaults wholesale; lists are not merged.
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        if let Some(v) = overlay.trigger_phrases {
            self.trigger_phrases = v;
        }
        if let Some(v) = overlay.blocked_tools {
            self.blocked_tools = v;
        }
        if let Some(v) = overlay.read_only_bash_commands {
            self.read_only_prefixes = v;
        }
        if let Some(mcp) = overlay.mcp_blocking {
            if let Some(v) = mcp.enabled {
                self.mcp_blocking.enabled = v;
            }
            if let Some(v) = mcp.patterns {
                self.mcp_blocking.mutation_tokens = v;
            }
        }
        if overlay.developer_name.is_some() {
            self.developer_name = overlay.developer_name;
        }
    }

    pub fn developer_name(&self) -> &str {
        self.developer_name
            .as_deref()
            .unwrap_or(DEFAULT_DEVELOPER_NAME)
    }

    pub fn is_blocked_tool(&self, tool_name: &str) -> bool {
        self.blocked_tools.iter().any(|t| t == tool_name)
    }
}

// ── Providers ──

/// Source of the policy for one invocation.
///
/// `load` is infallible: a provider that cannot read its source hands back
/// the built-in defaults, which are sufficient on their own.
pub trait ConfigProvider {
    fn load(&self) -> PolicyConfig;
}

/// Reads `sessions/sessions-config.json` (or any JSON file) on every load.
#[derive(Debug, Clone)]
pub struct FileConfigProvider {
    path: PathBuf,
}

impl FileConfigProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigProvider for FileConfigProvider {
    fn load(&self) -> PolicyConfig {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no config at {}, using defaults", self.path.display());
                return PolicyConfig::default_config();
            }
            Err(e) => {
                warn!("cannot read config {}: {e}; using defaults", self.path.display());
                return PolicyConfig::default_config();
            }
        };
        match PolicyConfig::from_json(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!("config parse error in {}: {e}; using defaults", self.path.display());
                PolicyConfig::default_config()
            }
        }
    }
}

/// Hands out a fixed config. Used when embedding the gate and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider(pub PolicyConfig);

impl ConfigProvider for StaticConfigProvider {
    fn load(&self) -> PolicyConfig {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_for(content: &str) -> (tempfile::TempDir, FileConfigProvider) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions-config.json");
        std::fs::write(&path, content).unwrap();
        (dir, FileConfigProvider::new(path))
    }

    #[test]
    fn default_config_parses() {
        let config = PolicyConfig::default_config();
        assert_eq!(config.trigger_phrases, vec!["make it so", "run that"]);
        assert_eq!(
            config.blocked_tools,
            vec!["Edit", "Write", "MultiEdit", "NotebookEdit"]
        );
        assert_eq!(config.read_only_prefixes.len(), 81);
        assert!(config.mcp_blocking.enabled);
        assert_eq!(config.mcp_blocking.mutation_tokens.len(), 14);
        assert!(config.developer_name.is_none());
    }

    #[test]
    fn default_prefixes_cover_both_platforms() {
        let config = PolicyConfig::default_config();
        for prefix in ["ls", "git status", "sed -n", "tar -t", "Get-ChildItem", "certutil -hashfile"] {
            assert!(
                config.read_only_prefixes.iter().any(|p| p == prefix),
                "missing default prefix {prefix}"
            );
        }
    }

    #[test]
    fn default_tokens_in_order() {
        let config = PolicyConfig::default_config();
        assert_eq!(config.mcp_blocking.mutation_tokens.first().unwrap(), "create");
        assert_eq!(config.mcp_blocking.mutation_tokens.last().unwrap(), "set");
    }

    #[test]
    fn overlay_replaces_present_keys_only() {
        let config = PolicyConfig::from_json(r#"{"blocked_tools": ["Write"]}"#).unwrap();
        assert_eq!(config.blocked_tools, vec!["Write"]);
        assert_eq!(config.trigger_phrases, vec!["make it so", "run that"]);
        assert_eq!(config.read_only_prefixes.len(), 81);
    }

    #[test]
    fn overlay_mcp_keys_fall_back_individually() {
        let config = PolicyConfig::from_json(r#"{"mcp_blocking": {"enabled": false}}"#).unwrap();
        assert!(!config.mcp_blocking.enabled);
        assert_eq!(config.mcp_blocking.mutation_tokens.len(), 14);

        let config = PolicyConfig::from_json(r#"{"mcp_blocking": {"patterns": ["nuke"]}}"#).unwrap();
        assert!(config.mcp_blocking.enabled);
        assert_eq!(config.mcp_blocking.mutation_tokens, vec!["nuke"]);
    }

    #[test]
    fn overlay_ignores_unrelated_keys() {
        let config = PolicyConfig::from_json(
            r#"{"developer_name": "Sam", "task_detection": {"enabled": true}}"#,
        )
        .unwrap();
        assert_eq!(config.developer_name(), "Sam");
        assert_eq!(config.blocked_tools.len(), 4);
    }

    #[test]
    fn developer_name_defaults() {
        assert_eq!(PolicyConfig::default_config().developer_name(), "the developer");
    }

    #[test]
    fn wrong_type_is_an_error() {
        assert!(PolicyConfig::from_json(r#"{"blocked_tools": "Edit"}"#).is_err());
    }

    #[test]
    fn file_provider_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FileConfigProvider::new(dir.path().join("nope.json"));
        assert_eq!(provider.load(), PolicyConfig::default_config());
    }

    #[test]
    fn file_provider_malformed_file_uses_defaults() {
        let (_dir, provider) = provider_for("{ not json");
        assert_eq!(provider.load(), PolicyConfig::default_config());
    }

    #[test]
    fn file_provider_wrong_types_use_defaults() {
        let (_dir, provider) = provider_for(r#"{"mcp_blocking": {"enabled": "yes"}}"#);
        assert_eq!(provider.load(), PolicyConfig::default_config());
    }

    #[test]
    fn file_provider_reads_overlay() {
        let (_dir, provider) = provider_for(r#"{"read_only_bash_commands": ["ls"]}"#);
        assert_eq!(provider.load().read_only_prefixes, vec!["ls"]);
    }

    #[test]
    fn is_blocked_tool_exact_match() {
        let config = PolicyConfig::default_config();
        assert!(config.is_blocked_tool("Edit"));
        assert!(!config.is_blocked_tool("edit"));
        assert!(!config.is_blocked_tool("Read"));
    }
}

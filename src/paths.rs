//! Locating the project and the files the hooks share.

use std::path::{Path, PathBuf};

use log::warn;

/// Env var Claude Code sets to the project the session runs in.
pub const PROJECT_DIR_ENV: &str = "CLAUDE_PROJECT_DIR";
/// Overrides the config file location.
pub const CONFIG_ENV: &str = "DAIC_CONFIG";
/// Overrides the mode state file location.
pub const STATE_ENV: &str = "DAIC_STATE";

/// Files used by the hooks of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub config_file: PathBuf,
    pub state_file: PathBuf,
}

impl ProjectPaths {
    /// Standard layout under `root`.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            config_file: root.join("sessions").join("sessions-config.json"),
            state_file: root.join(".claude").join("state").join("daic-mode.json"),
            root,
        }
    }

    /// Directory holding the mode file and the session flag files.
    pub fn state_dir(&self) -> &Path {
        self.state_file.parent().unwrap_or(&self.root)
    }

    /// Resolve paths for the current process.
    ///
    /// Root: `$CLAUDE_PROJECT_DIR`, else the nearest ancestor of the working
    /// directory containing `.claude/`, else the working directory.
    /// `$DAIC_CONFIG` and `$DAIC_STATE` override individual files.
    pub fn discover() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let root = env_path(PROJECT_DIR_ENV).unwrap_or_else(|| find_project_root(&cwd));

        let mut paths = Self::for_root(root);
        if let Some(p) = env_path(CONFIG_ENV) {
            paths.config_file = p;
        }
        if let Some(p) = env_path(STATE_ENV) {
            paths.state_file = p;
        }
        paths
    }
}

/// Walk up from `start` to the first directory that has a `.claude` child.
pub fn find_project_root(start: &Path) -> PathBuf {
    start
        .ancestors()
        .find(|dir| dir.join(".claude").is_dir())
        .unwrap_or(start)
        .to_path_buf()
}

/// Read a path from the environment, expanding `~` and `$VARS`.
fn env_path(key: &str) -> Option<PathBuf> {
    let raw = std::env::var(key).ok().filter(|v| !v.trim().is_empty())?;
    expand_path(&raw).or_else(|| {
        warn!("{key}={raw} could not be expanded; ignoring");
        None
    })
}

/// Expand `~` and environment variables in a user-supplied path.
pub fn expand_path(raw: &str) -> Option<PathBuf> {
    shellexpand::full(raw)
        .ok()
        .map(|expanded| PathBuf::from(expanded.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_layout() {
        let paths = ProjectPaths::for_root("/proj");
        assert_eq!(paths.config_file, PathBuf::from("/proj/sessions/sessions-config.json"));
        assert_eq!(paths.state_file, PathBuf::from("/proj/.claude/state/daic-mode.json"));
        assert_eq!(paths.state_dir(), Path::new("/proj/.claude/state"));
    }

    #[test]
    fn finds_nearest_claude_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".claude")).unwrap();
        let nested = dir.path().join("src/deep");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_project_root(&nested), dir.path());
    }

    #[test]
    fn falls_back_to_start() {
        let dir = tempfile::tempdir().unwrap();
        let root = find_project_root(dir.path());
        // a stray .claude higher up (e.g. in $HOME) would also be acceptable
        assert!(dir.path().starts_with(&root));
    }

    #[test]
    fn expands_plain_paths_unchanged() {
        assert_eq!(expand_path("/tmp/x.json"), Some(PathBuf::from("/tmp/x.json")));
    }

    #[test]
    fn expand_rejects_undefined_vars() {
        assert_eq!(expand_path("$DAIC_GATE_SURELY_UNDEFINED_VAR/x"), None);
    }
}

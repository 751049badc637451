//! The discussion/implementation mode and where it lives between invocations.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::GateError;

/// Workflow mode. Discussion is the safe default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Read and plan only; mutating tools are blocked.
    #[default]
    Discussion,
    /// Alignment granted; mutating tools are allowed.
    Implementation,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Discussion => "discussion",
            Mode::Implementation => "implementation",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Mode::Discussion => Mode::Implementation,
            Mode::Implementation => Mode::Discussion,
        }
    }

    pub fn is_discussion(self) -> bool {
        self == Mode::Discussion
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "discussion" => Ok(Mode::Discussion),
            "implementation" => Ok(Mode::Implementation),
            _ => Err(GateError::UnknownMode(s.to_string())),
        }
    }
}

/// On-disk record: `{"mode": "discussion"}`.
#[derive(Debug, Serialize, Deserialize)]
struct ModeRecord {
    mode: Mode,
}

/// Persistent home of the current mode.
///
/// `get` never fails: anything short of a committed, well-formed record reads
/// as [`Mode::Discussion`]. `set` must be atomic, so a concurrent `get` sees
/// either the old value or the new one.
pub trait ModeStore {
    fn get(&self) -> Mode;
    fn set(&self, mode: Mode) -> Result<(), GateError>;
}

/// Mode persisted as JSON, normally at `.claude/state/daic-mode.json`.
#[derive(Debug, Clone)]
pub struct FileModeStore {
    path: PathBuf,
}

impl FileModeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the default record if none exists yet. Returns true if it wrote.
    pub fn ensure_initialized(&self) -> Result<bool, GateError> {
        if self.path.exists() {
            return Ok(false);
        }
        self.set(Mode::default())?;
        Ok(true)
    }

    fn write_error(&self, source: std::io::Error) -> GateError {
        GateError::StateWrite {
            path: self.path.clone(),
            source,
        }
    }
}

impl ModeStore for FileModeStore {
    fn get(&self) -> Mode {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no mode state at {}, assuming discussion", self.path.display());
                return Mode::Discussion;
            }
            Err(e) => {
                warn!("cannot read mode state {}: {e}; assuming discussion", self.path.display());
                return Mode::Discussion;
            }
        };
        match serde_json::from_str::<ModeRecord>(&content) {
            Ok(record) => record.mode,
            Err(e) => {
                warn!("corrupt mode state {}: {e}; assuming discussion", self.path.display());
                Mode::Discussion
            }
        }
    }

    fn set(&self, mode: Mode) -> Result<(), GateError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| self.write_error(e))?;

        let data = serde_json::to_string_pretty(&ModeRecord { mode })
            .map_err(|e| self.write_error(std::io::Error::other(e)))?;

        // Each call gets its own temp file in the target directory; it is
        // removed on drop if the rename never happens.
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.write_error(e))?;
        tmp.write_all(data.as_bytes()).map_err(|e| self.write_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.write_error(e.error))?;
        debug!("mode set to {mode} at {}", self.path.display());
        Ok(())
    }
}

/// In-process store for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryModeStore {
    mode: Mutex<Mode>,
}

impl MemoryModeStore {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode: Mutex::new(mode),
        }
    }
}

impl ModeStore for MemoryModeStore {
    fn get(&self) -> Mode {
        // a poisoned lock still holds a committed value
        *self.mode.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set(&self, mode: Mode) -> Result<(), GateError> {
        *self.mode.lock().unwrap_or_else(|e| e.into_inner()) = mode;
        Ok(())
    }
}

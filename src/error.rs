use std::path::PathBuf;

use thiserror::Error;

/// Fatal conditions at the hook boundary.
///
/// Configuration and state *read* problems never appear here: they fall back
/// to defaults. What remains are contract violations by the caller and
/// failures to commit a mode change.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("malformed hook input: {0}")]
    MalformedInput(#[from] serde_json::Error),

    #[error("malformed hook input: missing or invalid `{0}`")]
    MissingField(&'static str),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write mode state to {}: {source}", path.display())]
    StateWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown mode `{0}` (expected `discussion` or `implementation`)")]
    UnknownMode(String),
}

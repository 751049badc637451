//! Best-effort structural decomposition of shell command lines.
//!
//! This is not a shell grammar. It knows enough about quoting to avoid
//! splitting inside string literals, and enough about substitutions to pull
//! nested commands out for separate classification.

pub mod shell;
pub mod types;
pub mod words;

pub use shell::{extract_substitutions, has_output_redirection, split_command};
pub use types::{CommandSegment, Operator, Redirection, SplitCommand};
pub use words::base_command;

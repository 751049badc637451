//! Read-only vs mutating classification of shell command lines.
//!
//! A [`CommandClassifier`] runs an ordered list of [`ClassifierStrategy`]s.
//! The first strategy to return a [`Finding`] decides; when all of them
//! abstain the command is mutating. The default chain is:
//!
//! 1. [`MutationPatternStrategy`]: deny-by-pattern over the whole line, so
//!    a write hidden behind a safe prefix (`ls > out`) is still caught.
//! 2. [`ReadOnlyPrefixStrategy`]: allow-by-prefix, all-or-nothing across
//!    every segment of a chain.

/// Deny-by-pattern: redirections, file-mutating utilities, package installs.
pub mod patterns;
/// Allow-by-prefix over each segment of a chained command.
pub mod prefix;

pub use patterns::MutationPatternStrategy;
pub use prefix::ReadOnlyPrefixStrategy;

use log::debug;

use crate::config::PolicyConfig;
use crate::parse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    ReadOnly,
    Mutating,
}

/// A classification plus the reason for it (for logs, never for the agent).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub classification: Classification,
    pub reason: String,
}

impl Finding {
    pub fn read_only(reason: impl Into<String>) -> Self {
        Self {
            classification: Classification::ReadOnly,
            reason: reason.into(),
        }
    }

    pub fn mutating(reason: impl Into<String>) -> Self {
        Self {
            classification: Classification::Mutating,
            reason: reason.into(),
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.classification == Classification::ReadOnly
    }
}

/// One step of the classification chain.
pub trait ClassifierStrategy: Send + Sync {
    /// Short name used in log records.
    fn name(&self) -> &'static str;

    /// Decide, or return `None` to defer to the next strategy.
    fn classify(&self, command: &str) -> Option<Finding>;
}

/// Ordered chain of strategies. Fails closed.
pub struct CommandClassifier {
    strategies: Vec<Box<dyn ClassifierStrategy>>,
}

impl CommandClassifier {
    /// The standard chain: mutation patterns, then the configured prefixes.
    pub fn from_config(config: &PolicyConfig) -> Self {
        Self::with_strategies(vec![
            Box::new(MutationPatternStrategy),
            Box::new(ReadOnlyPrefixStrategy::new(
                config.read_only_prefixes.iter().cloned(),
            )),
        ])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn ClassifierStrategy>>) -> Self {
        Self { strategies }
    }

    /// Substitution bodies run whatever quoting surrounds them, so each one
    /// goes through the whole chain before the line itself is judged.
    pub fn classify(&self, command: &str) -> Finding {
        let (_, bodies) = parse::extract_substitutions(command);
        for body in &bodies {
            let finding = self.classify(body);
            if !finding.is_read_only() {
                return Finding::mutating(format!("substitution `{body}`: {}", finding.reason));
            }
        }

        for strategy in &self.strategies {
            if let Some(finding) = strategy.classify(command) {
                debug!(
                    "{} classified {command:?} as {:?}: {}",
                    strategy.name(),
                    finding.classification,
                    finding.reason
                );
                return finding;
            }
        }
        Finding::mutating("no strategy recognized the command")
    }

    pub fn is_read_only(&self, command: &str) -> bool {
        self.classify(command).is_read_only()
    }
}

/// Whether `command` is read-only under `config`.
pub fn is_read_only(command: &str, config: &PolicyConfig) -> bool {
    CommandClassifier::from_config(config).is_read_only(command)
}

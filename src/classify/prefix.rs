use super::{ClassifierStrategy, Finding};
use crate::parse::{self, CommandSegment};

/// Allow-by-prefix strategy.
///
/// Every segment of the chain, and every segment of every substitution
/// body, must start with a read-only prefix. Always decides.
pub struct ReadOnlyPrefixStrategy {
    prefixes: Vec<String>,
}

impl ReadOnlyPrefixStrategy {
    /// Blank prefixes are dropped: they would admit every command.
    pub fn new(prefixes: impl IntoIterator<Item = String>) -> Self {
        Self {
            prefixes: prefixes
                .into_iter()
                .filter(|p| !p.trim().is_empty())
                .collect(),
        }
    }

    fn admits(&self, segment: &CommandSegment) -> bool {
        self.prefixes
            .iter()
            .any(|prefix| starts_with_prefix(segment.as_str(), prefix))
    }

    /// Returns the first offending segment, if any.
    fn first_rejected(&self, command: &str) -> Option<String> {
        let split = parse::split_command(command);

        for body in &split.substitutions {
            if let Some(rejected) = self.first_rejected(body) {
                return Some(rejected);
            }
        }
        split
            .segments
            .iter()
            .find(|segment| !self.admits(segment))
            .map(|segment| segment.text.clone())
    }
}

/// A single-word prefix must end at a word boundary (`ls` admits `ls -la`
/// but not `lsblk`). A prefix that already carries an argument (`tar -t`)
/// is a plain string prefix, so `tar -tzf` is admitted.
fn starts_with_prefix(segment: &str, prefix: &str) -> bool {
    let Some(rest) = segment.strip_prefix(prefix) else {
        return false;
    };
    prefix.trim().contains(char::is_whitespace)
        || rest.is_empty()
        || rest.starts_with(char::is_whitespace)
}

impl ClassifierStrategy for ReadOnlyPrefixStrategy {
    fn name(&self) -> &'static str {
        "read-only-prefixes"
    }

    fn classify(&self, command: &str) -> Option<Finding> {
        if parse::split_command(command).is_empty() {
            return Some(Finding::read_only("empty command"));
        }
        Some(match self.first_rejected(command) {
            None => Finding::read_only("every segment has a read-only prefix"),
            Some(segment) => Finding::mutating(format!(
                "`{}` is not a read-only command (segment: {segment})",
                parse::base_command(&segment)
            )),
        })
    }
}

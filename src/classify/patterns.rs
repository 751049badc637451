use std::sync::LazyLock;

use regex::Regex;

use super::{ClassifierStrategy, Finding};
use crate::parse;

/// A construct that always mutates, matched against the whole command line.
struct MutationPattern {
    description: &'static str,
    regex: Regex,
    /// A match is ignored when the text right after it matches this
    /// (the safe-flag form of an otherwise mutating utility).
    exempt_after: Option<Regex>,
}

impl MutationPattern {
    fn matches(&self, command: &str) -> bool {
        self.regex.find_iter(command).any(|m| {
            self.exempt_after
                .as_ref()
                .is_none_or(|exempt| !exempt.is_match(&command[m.end()..]))
        })
    }
}

/// (description, pattern, exempt-after pattern), checked in order.
const PATTERN_TABLE: &[(&str, &str, Option<&str>)] = &[
    ("tee", r"\btee\b", None),
    ("mv", r"\bmv\b", None),
    ("cp", r"\bcp\b", None),
    ("rm", r"\brm\b", None),
    ("mkdir", r"\bmkdir\b", None),
    ("touch", r"\btouch\b", None),
    ("in-place sed", r"\bsed\s+(-[a-zA-Z]*i\b|-i\b)", None),
    // `\s+` is greedy and never gives back whitespace, so `sed  -n` is
    // exempt here too; the read-only prefix `sed -n` still rejects it.
    ("sed without -n", r"\bsed\s+", Some(r"^-n\b")),
    ("npm install", r"\bnpm\s+install", None),
    ("pip install", r"\bpip\s+install", None),
    ("apt install", r"\bapt\s+install", None),
    ("yum install", r"\byum\s+install", None),
    ("brew install", r"\bbrew\s+install", None),
];

static PATTERNS: LazyLock<Vec<MutationPattern>> = LazyLock::new(|| {
    PATTERN_TABLE
        .iter()
        .map(|&(description, pattern, exempt)| MutationPattern {
            description,
            regex: Regex::new(pattern).expect("built-in mutation pattern must compile"),
            exempt_after: exempt
                .map(|p| Regex::new(p).expect("built-in exemption pattern must compile")),
        })
        .collect()
});

/// Deny-by-pattern strategy.
///
/// Reports [`Mutating`](super::Classification::Mutating) on the first hit
/// and abstains otherwise; it never declares a command read-only.
pub struct MutationPatternStrategy;

impl ClassifierStrategy for MutationPatternStrategy {
    fn name(&self) -> &'static str {
        "mutation-patterns"
    }

    fn classify(&self, command: &str) -> Option<Finding> {
        if let Some(r) = parse::has_output_redirection(command) {
            return Some(Finding::mutating(r.description));
        }
        PATTERNS
            .iter()
            .find(|p| p.matches(command))
            .map(|p| Finding::mutating(format!("mutating construct: {}", p.description)))
    }
}

//! Types produced by the shell parser and consumed by the classifier.

/// Shell operator separating consecutive command segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `&&`
    And,
    /// `||`
    Or,
    /// `;`
    Semi,
    /// `|`
    Pipe,
    /// `|&` (pipe stdout and stderr)
    PipeErr,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::Semi => ";",
            Operator::Pipe => "|",
            Operator::PipeErr => "|&",
        }
    }
}

/// One link of a chained command line, trimmed and never empty.
///
/// Substitution bodies have been replaced with `__SUBST__` placeholders, so
/// the text is the command that runs at this position of the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSegment {
    pub text: String,
}

impl CommandSegment {
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// An output redirection that writes to a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirection {
    /// Human-readable description, e.g. `"output redirection (>>)"`.
    pub description: String,
}

/// A command line broken into its segments, the operators between them,
/// and the bodies of any command/process substitutions.
///
/// `ls && git status | head` yields three segments and two operators.
#[derive(Debug, Clone, Default)]
pub struct SplitCommand {
    pub segments: Vec<CommandSegment>,
    pub operators: Vec<Operator>,
    pub substitutions: Vec<String>,
}

impl SplitCommand {
    /// True when the line held nothing but whitespace and operators.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() && self.substitutions.is_empty()
    }
}

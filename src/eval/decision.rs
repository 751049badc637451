/// Exit status that lets the tool call proceed.
pub const ALLOW_EXIT_CODE: i32 = 0;
/// Exit status that blocks the call and feeds stderr back to the agent.
pub const BLOCK_EXIT_CODE: i32 = 2;

/// Outcome of evaluating one tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub allow: bool,
    pub exit_code: i32,
    /// Text for the error stream; set only when blocking.
    pub message: Option<String>,
    /// Why the verdict was reached, for the decision log.
    pub reason: String,
}

impl Verdict {
    pub fn allow(reason: impl Into<String>) -> Self {
        Self {
            allow: true,
            exit_code: ALLOW_EXIT_CODE,
            message: None,
            reason: reason.into(),
        }
    }

    pub fn block(message: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            allow: false,
            exit_code: BLOCK_EXIT_CODE,
            message: Some(message.into()),
            reason: reason.into(),
        }
    }

    pub fn is_blocked(&self) -> bool {
        !self.allow
    }

    pub fn label(&self) -> &'static str {
        if self.allow { "ALLOW" } else { "BLOCK" }
    }
}

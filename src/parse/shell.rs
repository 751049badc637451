use super::types::{CommandSegment, Operator, Redirection, SplitCommand};

/// Placeholder left in the outer command where a substitution was removed.
pub const SUBST_PLACEHOLDER: &str = "__SUBST__";

/// Tracks single/double quoting and backslash escapes while scanning.
#[derive(Debug, Default)]
struct Quotes {
    single: bool,
    double: bool,
    escaped: bool,
}

impl Quotes {
    /// Consume quoting syntax. Returns true when `c` is an escape, a quote
    /// delimiter, or an escaped character; none of these can start an operator.
    fn step(&mut self, c: char) -> bool {
        if self.escaped {
            self.escaped = false;
            return true;
        }
        match c {
            '\\' if !self.single => {
                self.escaped = true;
                true
            }
            '\'' if !self.double => {
                self.single = !self.single;
                true
            }
            '"' if !self.single => {
                self.double = !self.double;
                true
            }
            _ => false,
        }
    }

    fn quoted(&self) -> bool {
        self.single || self.double
    }
}

fn push_segment(segments: &mut Vec<CommandSegment>, raw: &str) {
    let text = raw.trim();
    if !text.is_empty() {
        segments.push(CommandSegment {
            text: text.to_string(),
        });
    }
}

/// Split at `&&`, `||`, `;`, `|` and `|&` outside quotes.
/// Empty segments (e.g. from `ls ;; pwd` or a trailing `;`) are dropped.
fn split_operators(command: &str) -> (Vec<CommandSegment>, Vec<Operator>) {
    let chars: Vec<char> = command.chars().collect();
    let mut segments = Vec::new();
    let mut operators = Vec::new();
    let mut buf = String::new();
    let mut quotes = Quotes::default();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if quotes.step(c) || quotes.quoted() {
            buf.push(c);
            i += 1;
            continue;
        }

        let op = match (c, chars.get(i + 1).copied()) {
            ('&', Some('&')) => Some((Operator::And, 2)),
            ('|', Some('|')) => Some((Operator::Or, 2)),
            ('|', Some('&')) => Some((Operator::PipeErr, 2)),
            ('|', _) => Some((Operator::Pipe, 1)),
            (';', _) => Some((Operator::Semi, 1)),
            _ => None,
        };

        match op {
            Some((op, width)) => {
                push_segment(&mut segments, &buf);
                buf.clear();
                operators.push(op);
                i += width;
            }
            None => {
                buf.push(c);
                i += 1;
            }
        }
    }
    push_segment(&mut segments, &buf);

    (segments, operators)
}

/// Read a parenthesised body starting just after its opening `(`.
/// Returns the body and the index following the matching `)`.
fn take_balanced(chars: &[char], start: usize) -> (String, usize) {
    let mut depth: u32 = 1;
    let mut body = String::new();
    let mut quotes = Quotes::default();
    let mut i = start;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        if !quotes.step(c) && !quotes.quoted() {
            if c == '(' {
                depth += 1;
            } else if c == ')' {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
        }
        body.push(c);
    }

    (body, i)
}

/// Read a backtick body starting just after the opening backtick.
/// Backticks do not nest.
fn take_backtick(chars: &[char], start: usize) -> (String, usize) {
    let mut body = String::new();
    let mut i = start;

    while i < chars.len() && chars[i] != '`' {
        if chars[i] == '\\' && i + 1 < chars.len() {
            body.push(chars[i]);
            body.push(chars[i + 1]);
            i += 2;
            continue;
        }
        body.push(chars[i]);
        i += 1;
    }

    // skip the closing backtick, if any
    (body, (i + 1).min(chars.len()))
}

/// Pull `$(...)`, backtick and `<(...)` / `>(...)` bodies out of a command.
///
/// Returns the outer command with each body replaced by [`SUBST_PLACEHOLDER`]
/// plus the extracted bodies, outermost first. Nested substitutions stay
/// inside their parent body and are found when that body is split in turn.
/// `$()` is expanded by the shell inside double quotes, so only single
/// quotes suppress extraction.
pub fn extract_substitutions(command: &str) -> (String, Vec<String>) {
    let chars: Vec<char> = command.chars().collect();
    let mut outer = String::new();
    let mut bodies = Vec::new();
    let mut quotes = Quotes::default();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if quotes.step(c) || quotes.single {
            outer.push(c);
            i += 1;
            continue;
        }

        let opens_group = chars.get(i + 1) == Some(&'(')
            && (c == '$' || (!quotes.double && (c == '<' || c == '>')));

        let taken = if opens_group {
            Some(take_balanced(&chars, i + 2))
        } else if c == '`' {
            Some(take_backtick(&chars, i + 1))
        } else {
            None
        };

        match taken {
            Some((body, next)) => {
                let body = body.trim();
                if !body.is_empty() {
                    bodies.push(body.to_string());
                }
                // the `<`/`>` of a process substitution is dropped so it
                // cannot read as a redirection later
                outer.push_str(SUBST_PLACEHOLDER);
                i = next;
            }
            None => {
                outer.push(c);
                i += 1;
            }
        }
    }

    (outer, bodies)
}

/// Decompose a command line into segments, operators and substitution bodies.
pub fn split_command(command: &str) -> SplitCommand {
    let (outer, substitutions) = extract_substitutions(command);
    let (segments, operators) = split_operators(&outer);
    SplitCommand {
        segments,
        operators,
        substitutions,
    }
}

/// Detect output redirection (`>`, `>>`, `&>`, `N>`) outside quotes.
///
/// Input redirection, here-docs, fd duplication (`2>&1`, `>&2`), fd closing
/// (`2>&-`) and process substitution (`>(...)`) are not file writes.
pub fn has_output_redirection(command: &str) -> Option<Redirection> {
    let chars: Vec<char> = command.chars().collect();
    let at = |i: usize| chars.get(i).copied();
    let is_fd_target = |c: Option<char>| c.is_some_and(|c| c.is_ascii_digit() || c == '-');
    let mut quotes = Quotes::default();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if quotes.step(c) || quotes.quoted() {
            i += 1;
            continue;
        }

        if c == '&' && at(i + 1) == Some('>') {
            return Some(Redirection {
                description: "output redirection (&>)".into(),
            });
        }

        if c.is_ascii_digit() && at(i + 1) == Some('>') {
            if at(i + 2) == Some('&') && is_fd_target(at(i + 3)) {
                i += 4;
                continue;
            }
            return Some(Redirection {
                description: format!("output redirection ({c}>)"),
            });
        }

        if c == '>' {
            if at(i + 1) == Some('(') {
                i += 1;
                continue;
            }
            if at(i + 1) == Some('&') && is_fd_target(at(i + 2)) {
                i += 3;
                continue;
            }
            let description = if at(i + 1) == Some('>') {
                "output redirection (>>)"
            } else {
                "output redirection (>)"
            };
            return Some(Redirection {
                description: description.into(),
            });
        }

        i += 1;
    }

    None
}

/// True for a leading `NAME=value` word.
fn is_assignment(word: &str) -> bool {
    let Some((name, _)) = word.split_once('=') else {
        return false;
    };
    name.chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Extract the name of the program a segment runs, skipping leading
/// `VAR=value` assignments and any directory part (`/usr/bin/rm` → `rm`).
pub fn base_command(segment: &str) -> String {
    let word = segment
        .split_whitespace()
        .find(|w| !is_assignment(w))
        .unwrap_or("");
    match word.rsplit_once('/') {
        Some((_, name)) if !name.is_empty() => name.to_string(),
        _ => word.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple() {
        assert_eq!(base_command("ls -la"), "ls");
    }

    #[test]
    fn skips_env_assignments() {
        assert_eq!(base_command("A=1 B_2=x git push"), "git");
    }

    #[test]
    fn strips_directories() {
        assert_eq!(base_command("/usr/bin/rm -rf x"), "rm");
        assert_eq!(base_command("./script.sh --flag"), "script.sh");
    }

    #[test]
    fn not_an_assignment() {
        assert_eq!(base_command("1X=2 cmd"), "1X=2");
        assert_eq!(base_command("=x cmd"), "=x");
    }

    #[test]
    fn empty() {
        assert_eq!(base_command("   "), "");
    }
}

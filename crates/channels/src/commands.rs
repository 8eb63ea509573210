//! Prefix command detection (`!channel`, `!clear`).

/// A command extracted from message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// Command name without the prefix, as typed.
    pub name: String,
    /// Whitespace-separated arguments following the name.
    pub args: Vec<String>,
}

/// Detect a prefix command at the start of `content`.
///
/// The name must follow the prefix immediately (`! channel` is not a command).
/// Leading whitespace before the prefix is ignored.
#[must_use]
pub fn parse_command(prefix: &str, content: &str) -> Option<ParsedCommand> {
    if prefix.is_empty() {
        return None;
    }
    let rest = content.trim_start().strip_prefix(prefix)?;
    if rest.starts_with(char::is_whitespace) {
        return None;
    }

    let mut words = rest.split_whitespace();
    let name = words.next()?.to_string();
    Some(ParsedCommand {
        name,
        args: words.map(str::to_string).collect(),
    })
}

//! Shell mode: scrollback lines and the command table.

/// Display class of a scrollback line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Output,
    /// Echo of what the user typed
    Command,
    Info,
    Error,
    Success,
}

/// One scrollback line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub kind: LineKind,
    pub content: String,
}

impl Line {
    pub fn new(kind: LineKind, content: impl Into<String>) -> Self {
        Self { kind, content: content.into() }
    }

    pub fn output(content: impl Into<String>) -> Self {
        Self::new(LineKind::Output, content)
    }

    pub fn command(content: impl Into<String>) -> Self {
        Self::new(LineKind::Command, content)
    }

    pub fn info(content: impl Into<String>) -> Self {
        Self::new(LineKind::Info, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(LineKind::Error, content)
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self::new(LineKind::Success, content)
    }
}

/// Informational commands and their fixed replies
pub const COMMANDS: &[(&str, &str)] = &[
    ("help", "COMMANDS: about, skills, projects, contact, clear, snake"),
    ("about", "Software engineer. Full-stack developer."),
    ("skills", "Rust, React, Node, SQL, Architecture."),
    ("projects", "Browse the PROJECTS_DIR folder on the desktop."),
    ("contact", "dev@example.com"),
];

pub const CLEAR_COMMAND: &str = "clear";
pub const GAME_COMMAND: &str = "snake";

pub const GAME_INIT_MESSAGE: &str = "INITIALIZING GAME ENGINE...";

/// Result of evaluating one submitted line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Wipe the scrollback
    Clear,
    /// Start the snake game after the launch delay
    LaunchGame,
    /// Line to append after the command echo
    Reply(Line),
    /// Nothing to add
    Nothing,
}

/// Lookup key for a raw input line
pub fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}

pub fn lookup(command: &str) -> Option<&'static str> {
    COMMANDS
        .iter()
        .find(|(name, _)| *name == command)
        .map(|(_, reply)| *reply)
}

/// Decide what a submitted line does. Never fails: unknown commands are
/// reported as an error line.
pub fn evaluate(input: &str) -> Outcome {
    let cmd = normalize(input);
    match cmd.as_str() {
        "" => Outcome::Nothing,
        CLEAR_COMMAND => Outcome::Clear,
        GAME_COMMAND => Outcome::LaunchGame,
        other => match lookup(other) {
            Some(reply) => Outcome::Reply(Line::output(reply)),
            None => Outcome::Reply(Line::error(format!("Command '{}' not found.", other))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  HeLp \t"), "help");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_known_commands() {
        for (name, reply) in COMMANDS {
            assert_eq!(evaluate(name), Outcome::Reply(Line::output(*reply)));
        }
        assert_eq!(
            evaluate(" SKILLS "),
            Outcome::Reply(Line::output(lookup("skills").unwrap()))
        );
    }

    #[test]
    fn test_control_commands() {
        assert_eq!(evaluate("clear"), Outcome::Clear);
        assert_eq!(evaluate("  CLEAR"), Outcome::Clear);
        assert_eq!(evaluate("Snake"), Outcome::LaunchGame);
    }

    #[test]
    fn test_unknown_and_empty() {
        assert_eq!(
            evaluate("  LS -la "),
            Outcome::Reply(Line::error("Command 'ls -la' not found."))
        );
        assert_eq!(evaluate(""), Outcome::Nothing);
        assert_eq!(evaluate("  "), Outcome::Nothing);
    }

    #[test]
    fn test_help_lists_every_command() {
        let help = lookup("help").unwrap();
        for (name, _) in COMMANDS.iter().filter(|(n, _)| *n != "help") {
            assert!(help.contains(name), "help is missing {}", name);
        }
        assert!(help.contains(CLEAR_COMMAND));
        assert!(help.contains(GAME_COMMAND));
    }
}

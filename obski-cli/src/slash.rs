//! Slash commands understood by the interactive prompt.
//!
//! Any line that does not start with `/` is a topic to explore.

/// Metadata describing a slash command.
#[derive(Debug, Clone)]
pub struct CommandInfo {
    /// Primary name including the slash, e.g., "/score".
    pub name: &'static str,
    /// Alternative spellings.
    pub aliases: &'static [&'static str],
    /// One-line description shown in /help.
    pub description: &'static str,
}

pub const COMMANDS: &[CommandInfo] = &[
    CommandInfo {
        name: "/score",
        aliases: &["/total"],
        description: "Show your cumulative Obscure Points",
    },
    CommandInfo {
        name: "/topics",
        aliases: &[],
        description: "List the topics you have already scored",
    },
    CommandInfo {
        name: "/reset",
        aliases: &[],
        description: "Clear your score and scored topics",
    },
    CommandInfo {
        name: "/help",
        aliases: &["/?"],
        description: "Show this help",
    },
    CommandInfo {
        name: "/quit",
        aliases: &["/exit", "/q"],
        description: "Leave OBSKI",
    },
];

/// One line of REPL input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput<'a> {
    Topic(&'a str),
    Score,
    Topics,
    Reset,
    Help,
    Quit,
    Unknown(&'a str),
    Blank,
}

/// Resolve a command name or alias to its primary name.
pub fn resolve(name: &str) -> Option<&'static str> {
    let lowered = name.to_lowercase();
    COMMANDS
        .iter()
        .find(|c| c.name == lowered || c.aliases.contains(&lowered.as_str()))
        .map(|c| c.name)
}

pub fn parse(line: &str) -> ReplInput<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ReplInput::Blank;
    }
    if !line.starts_with('/') {
        return ReplInput::Topic(line);
    }
    let name = line.split_whitespace().next().unwrap_or(line);
    match resolve(name) {
        Some("/score") => ReplInput::Score,
        Some("/topics") => ReplInput::Topics,
        Some("/reset") => ReplInput::Reset,
        Some("/help") => ReplInput::Help,
        Some("/quit") => ReplInput::Quit,
        _ => ReplInput::Unknown(name),
    }
}

pub fn help_text() -> String {
    let width = COMMANDS.iter().map(|c| c.name.len()).max().unwrap_or(0);
    let mut out = String::from("Type a topic to explore its citations, or:\n");
    for cmd in COMMANDS {
        out.push_str(&format!(
            "  {:<width$}  {}",
            cmd.name,
            cmd.description,
            width = width
        ));
        if !cmd.aliases.is_empty() {
            out.push_str(&format!(" (also {})", cmd.aliases.join(", ")));
        }
        out.push('\n');
    }
    out
}

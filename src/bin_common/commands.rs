//! Line commands for the interactive client

use chat::PeerId;

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    /// `/peer <id>`: open a conversation
    Peer(PeerId),
    /// `/users [term]`: list users, optionally filtered
    Users(Option<String>),
    /// `/hide`: behave as if the window lost visibility
    Hide,
    /// `/show`: visibility regained
    Show,
    /// `/quit`
    Quit,
    /// Anything else is chat text for the selected peer
    Message(String),
    /// Malformed command, with a usage hint
    Invalid(String),
}

pub fn parse_command(line: &str) -> InputCommand {
    let line = line.trim();
    if !line.starts_with('/') {
        return InputCommand::Message(line.to_string());
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    match name {
        "/peer" if rest.is_empty() => InputCommand::Invalid("usage: /peer <id>".to_string()),
        "/peer" => InputCommand::Peer(PeerId::new(rest)),
        "/users" if rest.is_empty() => InputCommand::Users(None),
        "/users" => InputCommand::Users(Some(rest.to_string())),
        "/hide" => InputCommand::Hide,
        "/show" => InputCommand::Show,
        "/quit" | "/exit" => InputCommand::Quit,
        other => InputCommand::Invalid(format!("unknown command: {}", other)),
    }
}

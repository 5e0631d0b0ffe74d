//! Slash command parsing for the chat shell.
//!
//! A line starting with `/` acts on the session instead of being sent to the
//! model.  These commands stand in for the settings controls a GUI would have.

/// Usage and summary for each command, in help order.
const COMMANDS: &[(&str, &str)] = &[
    ("/model <name>", "Switch model, e.g. /model claude-3-haiku-20240307"),
    ("/key <key>", "Set the API key ('/key clear' unsets it)"),
    ("/models", "List popular models per provider"),
    ("/clear", "Forget the conversation"),
    ("/history", "Show the conversation so far"),
    ("/stats", "Message count, model and key status"),
    ("/help", "This list"),
    ("/quit", "Leave (also /exit, /q, Ctrl+D)"),
];

/// Something the user asked the shell to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// `/clear`
    Clear,
    /// `/model <name>`; the name is free text.
    Model(String),
    /// `/key <key>`.  Empty means the key was cleared, which closes the gate.
    Key(String),
    /// `/models`
    Models,
    /// `/history`
    History,
    /// `/help` or `/?`
    Help,
    /// `/quit`, `/exit` or `/q`
    Quit,
    /// `/stats` or `/status`
    Stats,
    /// A known command used wrongly; carries the message to show.
    Invalid(String),
}

/// Interprets one input line.
///
/// `None` means the line is an ordinary prompt for the model.  That includes
/// lines such as `/usr/bin holds what?` whose first word is not a known
/// command.  Command names are case-insensitive.  The argument is everything
/// after the first whitespace character, kept as typed.
///
/// ```
/// # use llmchat::{ChatCommand, parse_command};
/// assert_eq!(parse_command("/q"), Some(ChatCommand::Quit));
/// assert_eq!(
///     parse_command("/model ollama/llama2"),
///     Some(ChatCommand::Model("ollama/llama2".into()))
/// );
/// assert_eq!(parse_command("what is 2/3?"), None);
/// assert_eq!(parse_command("/etc/hosts looks odd"), None);
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let body = input.trim_start().strip_prefix('/')?;
    let (name, argument) = match body.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, Some(rest).filter(|rest| !rest.is_empty())),
        None => (body, None),
    };

    let command = match (name.to_ascii_lowercase().as_str(), argument) {
        ("clear", _) => ChatCommand::Clear,
        ("model", Some(model)) => ChatCommand::Model(model.to_owned()),
        ("model", None) => ChatCommand::Invalid("usage: /model <name>".to_owned()),
        ("key", Some(key)) if key.eq_ignore_ascii_case("clear") => ChatCommand::Key(String::new()),
        ("key", Some(key)) => ChatCommand::Key(key.to_owned()),
        ("key", None) => ChatCommand::Invalid("usage: /key <key> or /key clear".to_owned()),
        ("models", _) => ChatCommand::Models,
        ("history", _) => ChatCommand::History,
        ("help" | "?", _) => ChatCommand::Help,
        ("quit" | "exit" | "q", _) => ChatCommand::Quit,
        ("stats" | "status", _) => ChatCommand::Stats,
        _ => return None,
    };
    Some(command)
}

/// The command list shown by `/help`, one command per line.
pub fn help_text() -> String {
    let width = COMMANDS.iter().map(|(usage, _)| usage.len()).max().unwrap_or(0);
    let mut text = String::from("Commands:");
    for (usage, summary) in COMMANDS {
        text.push_str(&format!("\n  {usage:<width$}  {summary}"));
    }
    text
}

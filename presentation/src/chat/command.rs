//! Slash command parsing

/// A line typed in the submission view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionInput {
    File(String),
    Url(String),
    Text(String),
    /// A plain line, appended to the text field
    Append(String),
    Upload,
    Clear,
    Help,
    Quit,
    Unknown(String),
}

/// A line typed in the chat view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    Prompt(String),
    End,
    Help,
    Quit,
    Unknown(String),
}

fn split_command(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix('/')?;
    match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => Some((name, arg.trim())),
        None => Some((rest, "")),
    }
}

impl SubmissionInput {
    pub fn parse(line: &str) -> Self {
        let Some((name, arg)) = split_command(line.trim()) else {
            return SubmissionInput::Append(line.to_string());
        };
        match (name, arg) {
            ("file" | "f", arg) if !arg.is_empty() => SubmissionInput::File(arg.to_string()),
            ("url" | "u", arg) if !arg.is_empty() => SubmissionInput::Url(arg.to_string()),
            ("text" | "t", arg) => SubmissionInput::Text(arg.to_string()),
            ("upload" | "send", _) => SubmissionInput::Upload,
            ("clear", _) => SubmissionInput::Clear,
            ("help" | "h" | "?", _) => SubmissionInput::Help,
            ("quit" | "exit" | "q", _) => SubmissionInput::Quit,
            _ => SubmissionInput::Unknown(line.trim().to_string()),
        }
    }
}

impl ChatInput {
    pub fn parse(line: &str) -> Self {
        let Some((name, _)) = split_command(line.trim()) else {
            return ChatInput::Prompt(line.to_string());
        };
        match name {
            "end" => ChatInput::End,
            "help" | "h" | "?" => ChatInput::Help,
            "quit" | "exit" | "q" => ChatInput::Quit,
            _ => ChatInput::Unknown(line.trim().to_string()),
        }
    }
}

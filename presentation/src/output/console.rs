//! Console rendering for the chat REPL

use colored::Colorize;
use insight_application::{Notice, NoticeLevel};
use insight_domain::{Message, Role};
use std::time::Duration;

/// Hint shown in an empty chat
pub const EMPTY_CHAT_HINT: &str = "No messages yet - ask something about the document.";

/// Formats REPL output as strings; the caller decides where they go.
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn banner() -> String {
        [
            "",
            "╭─────────────────────────────────────────────╮",
            "│          InsightAI - Document Chat          │",
            "╰─────────────────────────────────────────────╯",
            "",
        ]
        .join("\n")
    }

    /// Help for the submission view
    pub fn submission_help(idle_timeout: Duration) -> String {
        format!(
            "{}\n\
             \x20 /file PATH   - Attach a PDF, DOCX or TXT file\n\
             \x20 /url URL     - Ingest a web page\n\
             \x20 /text TEXT   - Ingest raw text (plain lines are appended too)\n\
             \x20 /upload      - Upload and start chatting\n\
             \x20 /clear       - Reset the form\n\
             \x20 /help        - Show this help\n\
             \x20 /quit        - Exit\n\n\
             {}",
            "Upload a document:".cyan().bold(),
            format!(
                "Sessions end after {} without activity.",
                Self::duration(idle_timeout)
            )
            .dimmed()
        )
    }

    /// Help for the chat view
    pub fn chat_help() -> String {
        format!(
            "{}\n\
             \x20 /end    - End this chat and delete the session\n\
             \x20 /help   - Show this help\n\
             \x20 /quit   - Exit\n\
             Anything else is sent as a question.",
            "Commands:".cyan().bold()
        )
    }

    pub fn chat_header(source_label: &str) -> String {
        let title = format!("Chat with {}", source_label);
        let line = "─".repeat(title.chars().count().max(20));
        format!("{}\n{}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    pub fn empty_chat() -> String {
        EMPTY_CHAT_HINT.dimmed().to_string()
    }

    pub fn message(message: &Message) -> String {
        let label = match message.role {
            Role::User => message.role.label().blue().bold(),
            Role::Assistant => message.role.label().green().bold(),
        };
        let mut lines = message.text.lines();
        let first = lines.next().unwrap_or_default();
        let mut output = format!("{}: {}", label, first);
        for line in lines {
            output.push('\n');
            output.push_str(&Self::indent(line, "    "));
        }
        output
    }

    pub fn notice(notice: &Notice) -> String {
        match notice.level {
            NoticeLevel::Success => format!("{} {}", "v".green(), notice.text.green()),
            NoticeLevel::Error => format!("{} {}", "x".red(), notice.text.red()),
        }
    }

    /// Summary of the pending submission form
    pub fn draft(file: Option<&str>, url: Option<&str>, text_chars: usize) -> String {
        let mut parts = Vec::new();
        if let Some(file) = file {
            parts.push(format!("file {}", file));
        }
        if let Some(url) = url {
            parts.push(format!("url {}", url));
        }
        if text_chars > 0 {
            parts.push(format!("{} chars of text", text_chars));
        }
        if parts.is_empty() {
            "Form is empty".dimmed().to_string()
        } else {
            format!("{} {}", "Ready:".dimmed(), parts.join(", "))
        }
    }

    pub fn unknown_command(cmd: &str) -> String {
        format!("Unknown command: {}\nType /help for available commands", cmd)
    }

    /// "15 minutes", "90 seconds", ...
    pub fn duration(duration: Duration) -> String {
        let secs = duration.as_secs();
        if secs >= 60 && secs % 60 == 0 {
            let minutes = secs / 60;
            if minutes == 1 {
                "1 minute".to_string()
            } else {
                format!("{} minutes", minutes)
            }
        } else if secs == 1 {
            "1 second".to_string()
        } else {
            format!("{} seconds", secs)
        }
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for insight-chat
#[derive(Parser, Debug)]
#[command(name = "insight-chat")]
#[command(author, version, about = "Chat with a document through the InsightAI backend")]
#[command(long_about = r#"
insight-chat uploads a document (a file, a web page, or pasted text) to the
InsightAI backend and opens a chat about it.

A session ends when you type /end, when you quit, or after a period without
activity (15 minutes by default).

Configuration files are loaded from (in priority order):
1. --config <path>          Explicit config file
2. INSIGHT_* variables      e.g. INSIGHT_BACKEND__BASE_URL
3. ./insight.toml           Project-level config
4. ~/.config/insight-chat/config.toml   Global config

Example:
  insight-chat
  insight-chat --file report.pdf
  insight-chat --url https://example.com/article --api-url http://localhost:8000
"#)]
pub struct Cli {
    /// Document to upload on start (PDF, DOCX or TXT)
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Web page to ingest on start
    #[arg(short, long, value_name = "URL")]
    pub url: Option<String>,

    /// Raw text to ingest on start
    #[arg(short, long, value_name = "TEXT")]
    pub text: Option<String>,

    /// Backend base URL (overrides backend.base_url)
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress the busy spinner
    #[arg(short, long)]
    pub quiet: bool,

    /// Also write diagnostics to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Whether a document was given on the command line
    pub fn has_submission(&self) -> bool {
        self.file.is_some() || self.url.is_some() || self.text.is_some()
    }
}

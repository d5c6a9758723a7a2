//! CLI entrypoint for insight-chat
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result};
use clap::Parser;
use insight_application::{
    ChatExchangeEngine, InMemorySessionStore, SessionContext, SessionLifecycleController,
};
use insight_domain::DocumentSubmission;
use insight_infrastructure::{
    ConfigLoader, FileConfig, HttpDocumentBackend, JsonlConversationLogger, TokioScheduler,
};
use insight_presentation::chat::SubmissionForm;
use insight_presentation::{ChatRepl, Cli, ReplConfig};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// How long to wait for best-effort session deletes on exit
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        let config = load_config(&cli)?;
        println!();
        println!("{}", config.to_toml().context("Failed to render configuration")?);
        return Ok(());
    }

    let config = load_config(&cli)?;
    config.validate().context("Invalid configuration")?;
    info!("Starting insight-chat against {}", config.backend.base_url);

    // === Dependency Injection ===
    let backend = Arc::new(
        HttpDocumentBackend::with_timeout(&config.backend.base_url, config.backend.timeout())
            .context("Failed to build HTTP client")?,
    );
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let mut context =
        SessionContext::new(Arc::new(InMemorySessionStore::new()), Arc::new(events_tx));

    if let Some(path) = &config.logging.conversation_log {
        match JsonlConversationLogger::open(path) {
            Ok(logger) => {
                info!("Writing conversation log to {}", logger.path().display());
                context = context.with_conversation_logger(Arc::new(logger));
            }
            Err(e) => warn!(
                "Could not open conversation log {}: {}",
                path.display(),
                e
            ),
        }
    }

    let session_config = config.session.to_session_config();
    let lifecycle = Arc::new(
        SessionLifecycleController::new(
            backend.clone(),
            Arc::new(TokioScheduler::new()),
            context.clone(),
        )
        .with_config(session_config.clone()),
    );
    let engine = Arc::new(ChatExchangeEngine::new(backend, context));

    let repl_config = ReplConfig {
        color: config.repl.color,
        show_banner: config.repl.show_banner,
        show_progress: !cli.quiet,
        idle_timeout: session_config.idle_timeout,
    };

    let initial = initial_submission(&cli).await?;
    ChatRepl::new(lifecycle.clone(), engine, events_rx, repl_config)
        .run(initial)
        .await?;

    if tokio::time::timeout(SHUTDOWN_GRACE, lifecycle.shutdown())
        .await
        .is_err()
    {
        warn!("Gave up waiting for session cleanup");
    }

    Ok(())
}

/// Stderr logging filtered by `-v` (or `RUST_LOG`), plus an optional file.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) if verbose == 0 => filter,
        _ => match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        },
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let file_name = path
                .file_name()
                .context("--log-file must name a file")?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };
    if let Some(api_url) = &cli.api_url {
        config.backend.base_url = api_url.clone();
    }
    Ok(config)
}

/// Document given with `--file`, `--url` or `--text`
async fn initial_submission(cli: &Cli) -> Result<Option<DocumentSubmission>> {
    if !cli.has_submission() {
        return Ok(None);
    }
    let mut form = SubmissionForm::new();
    if let Some(path) = &cli.file {
        form.attach_file(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
    }
    if let Some(url) = &cli.url {
        form.set_url(url);
    }
    if let Some(text) = &cli.text {
        form.set_text(text);
    }
    Ok(Some(form.to_submission()))
}

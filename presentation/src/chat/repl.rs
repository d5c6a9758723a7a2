//! REPL (Read-Eval-Print Loop) for the document chat

use super::command::{ChatInput, SubmissionInput};
use super::form::SubmissionForm;
use crate::config::ReplConfig;
use crate::output::console::ConsoleFormatter;
use crate::progress::BusyIndicator;
use colored::Colorize;
use insight_application::{
    ChatEvent, ChatExchangeEngine, IgnoreReason, SendOutcome, SessionLifecycleController, View,
};
use insight_domain::{ActivitySignal, DocumentSubmission, TerminationReason};
use std::future::Future;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Interactive chat REPL
///
/// Reads lines from stdin and [`ChatEvent`]s from the use cases in a single
/// loop. Questions are sent on their own tasks so the loop keeps rendering
/// while an answer is pending.
pub struct ChatRepl {
    lifecycle: Arc<SessionLifecycleController>,
    engine: Arc<ChatExchangeEngine>,
    events: mpsc::UnboundedReceiver<ChatEvent>,
    config: ReplConfig,
    view: View,
    form: SubmissionForm,
    indicator: BusyIndicator,
    exchanges: JoinSet<SendOutcome>,
}

impl ChatRepl {
    /// Create a new ChatRepl
    ///
    /// `events` must be the receiving end of the sink the use cases emit to.
    pub fn new(
        lifecycle: Arc<SessionLifecycleController>,
        engine: Arc<ChatExchangeEngine>,
        events: mpsc::UnboundedReceiver<ChatEvent>,
        config: ReplConfig,
    ) -> Self {
        if !config.color {
            colored::control::set_override(false);
        }
        Self {
            lifecycle,
            engine,
            events,
            indicator: BusyIndicator::new(config.show_progress),
            config,
            view: View::Submission,
            form: SubmissionForm::new(),
            exchanges: JoinSet::new(),
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    /// Run the interactive REPL until `/quit`, end of input, or Ctrl-C.
    ///
    /// `initial` is uploaded before the first line is read. On exit the
    /// active session, if any, is ended as a page unload.
    pub async fn run(self, initial: Option<DocumentSubmission>) -> io::Result<()> {
        let lines = BufReader::new(tokio::io::stdin()).lines();
        self.run_until(initial, lines, tokio::signal::ctrl_c()).await
    }

    /// Run over `lines` until they end, `/quit` is typed, or `interrupt`
    /// completes.
    async fn run_until<R, F>(
        mut self,
        initial: Option<DocumentSubmission>,
        mut lines: Lines<R>,
        interrupt: F,
    ) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        F: Future<Output = io::Result<()>>,
    {
        tokio::pin!(interrupt);
        let mut interruptible = true;

        if self.config.show_banner {
            println!("{}", ConsoleFormatter::banner());
        }
        if self.lifecycle.current_session().is_some() {
            self.enter_chat();
        } else {
            self.print(ConsoleFormatter::submission_help(self.config.idle_timeout));
        }
        if let Some(submission) = initial {
            self.upload(submission).await;
        }

        let result = loop {
            tokio::select! {
                Some(event) = self.events.recv() => self.handle_event(event),
                Some(joined) = self.exchanges.join_next(), if !self.exchanges.is_empty() => {
                    self.handle_outcome(joined);
                }
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        if self.handle_line(&line).await == Flow::Exit {
                            break Ok(());
                        }
                    }
                    Ok(None) => break Ok(()),
                    Err(e) => break Err(e),
                },
                signal = &mut interrupt, if interruptible => match signal {
                    Ok(()) => {
                        debug!("Interrupted");
                        println!();
                        break Ok(());
                    }
                    Err(e) => {
                        warn!("Cannot listen for Ctrl-C: {}", e);
                        interruptible = false;
                    }
                },
            }
        };

        self.finish();
        result
    }

    async fn handle_line(&mut self, line: &str) -> Flow {
        match self.view {
            View::Submission => self.handle_submission_line(line).await,
            View::Chat => self.handle_chat_line(line),
        }
    }

    async fn handle_submission_line(&mut self, line: &str) -> Flow {
        match SubmissionInput::parse(line) {
            SubmissionInput::File(path) => {
                let attached = self
                    .form
                    .attach_file(Path::new(&path))
                    .await
                    .map(|file| format!("Attached {} ({})", file.name, file.media_type));
                match attached {
                    Ok(message) => self.print(message.green()),
                    Err(e) => self.print(format!("Could not read {}: {}", path, e).red()),
                }
            }
            SubmissionInput::Url(url) => {
                self.form.set_url(&url);
                self.print_draft();
            }
            SubmissionInput::Text(text) => {
                self.form.set_text(&text);
                self.print_draft();
            }
            SubmissionInput::Append(line) => {
                if !line.trim().is_empty() {
                    self.form.append_text(&line);
                }
            }
            SubmissionInput::Upload => {
                let submission = self.form.to_submission();
                self.upload(submission).await;
            }
            SubmissionInput::Clear => {
                self.form.clear();
                self.print_draft();
            }
            SubmissionInput::Help => {
                self.print(ConsoleFormatter::submission_help(self.config.idle_timeout));
            }
            SubmissionInput::Quit => return Flow::Exit,
            SubmissionInput::Unknown(cmd) => self.print(ConsoleFormatter::unknown_command(&cmd)),
        }
        Flow::Continue
    }

    fn handle_chat_line(&mut self, line: &str) -> Flow {
        self.lifecycle.record_activity(ActivitySignal::KeyPress);

        match ChatInput::parse(line) {
            ChatInput::Prompt(prompt) => {
                if !prompt.trim().is_empty() {
                    let engine = Arc::clone(&self.engine);
                    self.exchanges
                        .spawn(async move { engine.send(&prompt).await });
                }
            }
            ChatInput::End => {
                self.lifecycle.terminate(TerminationReason::Explicit);
            }
            ChatInput::Help => self.print(ConsoleFormatter::chat_help()),
            ChatInput::Quit => return Flow::Exit,
            ChatInput::Unknown(cmd) => self.print(ConsoleFormatter::unknown_command(&cmd)),
        }
        Flow::Continue
    }

    fn handle_event(&mut self, event: ChatEvent) {
        match event {
            ChatEvent::Notice(notice) => self.print(ConsoleFormatter::notice(&notice)),
            ChatEvent::Navigate(View::Chat) => self.enter_chat(),
            ChatEvent::Navigate(View::Submission) => self.enter_submission(),
            // The user's own line is already on screen.
            ChatEvent::MessageAppended { message, .. } if !message.is_user() => {
                self.print(ConsoleFormatter::message(&message));
            }
            ChatEvent::MessageAppended { .. } => {}
            ChatEvent::BusyChanged(true) => self.indicator.start("Thinking..."),
            ChatEvent::BusyChanged(false) => self.indicator.stop(),
            ChatEvent::ScrollToLatest | ChatEvent::InputCleared => {}
            ChatEvent::TranscriptCleared => debug!("Transcript cleared"),
        }
    }

    fn handle_outcome(&mut self, joined: Result<SendOutcome, JoinError>) {
        match joined {
            Ok(SendOutcome::Ignored(IgnoreReason::Busy)) => {
                self.print("Still waiting for the previous answer.".dimmed());
            }
            Ok(outcome) => debug!("Exchange finished: {:?}", outcome),
            Err(e) if e.is_cancelled() => {}
            Err(e) => warn!("Exchange task failed: {}", e),
        }
    }

    fn enter_chat(&mut self) {
        let Ok(session) = self.lifecycle.validate_on_entry() else {
            return;
        };
        self.view = View::Chat;
        self.print(ConsoleFormatter::chat_header(session.source_label()));

        let transcript = self.engine.transcript();
        if transcript.is_empty() {
            self.print(ConsoleFormatter::empty_chat());
        }
        for message in &transcript {
            self.print(ConsoleFormatter::message(message));
        }
    }

    fn enter_submission(&mut self) {
        if self.view == View::Chat {
            self.lifecycle.leave_chat_view();
        }
        self.view = View::Submission;
        self.indicator.stop();
        self.print(ConsoleFormatter::submission_help(self.config.idle_timeout));
    }

    async fn upload(&mut self, submission: DocumentSubmission) {
        self.indicator.start("Uploading...");
        let result = self.lifecycle.create(submission).await;
        self.indicator.stop();
        if result.is_ok() {
            self.form.clear();
        }
    }

    fn finish(&mut self) {
        self.exchanges.abort_all();
        self.indicator.stop();
        if self.lifecycle.terminate(TerminationReason::PageUnload) {
            println!("Session closed.");
        }
        println!("Bye!");
    }

    fn print_draft(&self) {
        self.print(ConsoleFormatter::draft(
            self.form.file_name(),
            self.form.url(),
            self.form.text_chars(),
        ));
    }

    fn print(&self, line: impl std::fmt::Display) {
        self.indicator.println(line.to_string());
    }
}

//! Interactive chat module
//!
//! A line-based terminal interface with two views: the submission form and
//! the chat about the uploaded document.

mod command;
mod form;
mod repl;

pub use command::{ChatInput, SubmissionInput};
pub use form::SubmissionForm;
pub use repl::ChatRepl;

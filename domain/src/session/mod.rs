//! Document session domain.
//!
//! - [`entities::Session`]: the backend-issued handle bound to one ingested document
//! - [`entities::LifecycleState`]: states of the session lifecycle machine
//! - [`submission::DocumentSubmission`]: what the user hands over to open a session

pub mod entities;
pub mod submission;

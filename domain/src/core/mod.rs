//! Core domain concepts shared across all subdomains.
//!
//! - [`error::ValidationError`]: rejected document submissions

pub mod error;

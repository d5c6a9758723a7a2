//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod activity_monitor;
pub mod chat_exchange;
pub mod context;
pub mod session_lifecycle;

#[cfg(test)]
pub(crate) mod testing;

//! Chat domain.
//!
//! - [`entities::Message`]: one entry of a conversation
//! - [`entities::Transcript`]: the ordered, append-only record of one chat view

pub mod entities;

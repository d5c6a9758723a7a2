//! Progress indication

mod spinner;

pub use spinner::BusyIndicator;

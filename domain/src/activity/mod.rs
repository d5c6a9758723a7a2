//! User activity signals that keep a session alive

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Inactivity period after which a session is torn down.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// A qualifying user-activity signal observed in the chat view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivitySignal {
    PointerMove,
    KeyPress,
    Click,
    Scroll,
}

impl ActivitySignal {
    pub const ALL: [ActivitySignal; 4] = [
        ActivitySignal::PointerMove,
        ActivitySignal::KeyPress,
        ActivitySignal::Click,
        ActivitySignal::Scroll,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivitySignal::PointerMove => "pointer_move",
            ActivitySignal::KeyPress => "key_press",
            ActivitySignal::Click => "click",
            ActivitySignal::Scroll => "scroll",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_idle_timeout_is_fifteen_minutes() {
        assert_eq!(DEFAULT_IDLE_TIMEOUT.as_secs(), 900);
    }

    #[test]
    fn test_signal_names_are_distinct() {
        let mut names: Vec<_> = ActivitySignal::ALL.iter().map(|s| s.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 4);
    }
}

//! Spinner shown while the backend is working

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// A single spinner line, started and stopped as requests come and go
pub struct BusyIndicator {
    enabled: bool,
    bar: Option<ProgressBar>,
}

impl BusyIndicator {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, bar: None }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    pub fn start(&mut self, message: &str) {
        if !self.enabled {
            return;
        }
        match &self.bar {
            Some(bar) => bar.set_message(message.to_string()),
            None => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(Self::spinner_style());
                bar.set_message(message.to_string());
                bar.enable_steady_tick(Duration::from_millis(100));
                self.bar = Some(bar);
            }
        }
    }

    pub fn stop(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    pub fn is_spinning(&self) -> bool {
        self.bar.is_some()
    }

    /// Print a line without tearing the spinner
    pub fn println(&self, line: impl AsRef<str>) {
        match &self.bar {
            Some(bar) => bar.suspend(|| println!("{}", line.as_ref())),
            None => println!("{}", line.as_ref()),
        }
    }
}

impl Drop for BusyIndicator {
    fn drop(&mut self) {
        self.stop();
    }
}

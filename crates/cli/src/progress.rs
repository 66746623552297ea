//! Progress reporting for loader runs.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner shown while a loader phase runs.
pub struct PhaseProgress {
    bar: ProgressBar,
}

impl PhaseProgress {
    /// Starts a spinner labelled with `message`.
    pub fn start(message: impl Into<String>) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed}]")
                .expect("Invalid progress template"),
        );
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(120));
        PhaseProgress { bar }
    }

    /// Replaces the spinner with a completion line.
    pub fn finish_with_message(self, msg: impl Into<String>) {
        self.bar.finish_with_message(msg.into());
    }

    /// Clears the spinner without printing a completion line.
    pub fn abandon(self) {
        self.bar.finish_and_clear();
    }
}

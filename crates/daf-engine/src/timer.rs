//! Elapsed-time logging for pipeline stages.

use std::time::{Duration, Instant};

/// Logs how long a stage took, at `debug` level, when finished or dropped.
#[derive(Debug)]
pub struct Timer {
    label: &'static str,
    start: Instant,
}

impl Timer {
    #[must_use]
    pub fn start(label: &'static str) -> Self {
        Self { label, start: Instant::now() }
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Ends the stage now.
    pub fn finish(self) {}
}

impl Drop for Timer {
    fn drop(&mut self) {
        tracing::debug!(
            stage = self.label,
            elapsed_ms = u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "stage finished"
        );
    }
}

//! Contains types to report search progress.

#[cfg(test)]
#[path = "../tests/unit/telemetry_test.rs"]
mod telemetry_test;

use crate::utils::{Float, Timer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A logger type which is called with various information.
pub type InfoLogger = Arc<dyn Fn(&str) + Send + Sync>;

/// A single sample taken when the best known solution improves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressionEntry {
    /// Elapsed seconds since search start.
    pub elapsed_seconds: Float,
    /// A score of the new best solution.
    pub value: Float,
    /// An amount of iterations done so far.
    pub iterations: usize,
}

/// A series of improvements. Only strictly better values are accepted, so the series is
/// monotonically decreasing in value.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Progression {
    entries: Vec<ProgressionEntry>,
}

impl Progression {
    /// Adds a new entry if its value improves the last one. Returns true if entry was accepted.
    pub fn add(&mut self, entry: ProgressionEntry) -> bool {
        let is_better = self.entries.last().is_none_or(|last| entry.value < last.value);
        if is_better {
            self.entries.push(entry);
        }

        is_better
    }

    /// Returns accepted entries.
    pub fn entries(&self) -> &[ProgressionEntry] {
        self.entries.as_slice()
    }

    /// Returns the last accepted entry.
    pub fn last(&self) -> Option<&ProgressionEntry> {
        self.entries.last()
    }
}

/// Writes messages prefixed with elapsed time when enabled.
#[derive(Clone)]
pub struct Telemetry {
    logger: Option<InfoLogger>,
    timer: Timer,
}

impl Telemetry {
    /// Creates a new instance of `Telemetry`, `None` logger disables reporting.
    pub fn new(logger: Option<InfoLogger>) -> Self {
        Self { logger, timer: Timer::start() }
    }

    /// Restarts internal timer.
    pub fn restart(&mut self) {
        self.timer = Timer::start();
    }

    /// Returns elapsed seconds since creation or restart.
    pub fn elapsed_secs(&self) -> Float {
        self.timer.elapsed_secs_as_float()
    }

    /// Logs a message if logging is enabled.
    pub fn log(&self, message: &str) {
        if let Some(logger) = &self.logger {
            (logger)(format!("[{:.2}s] {message}", self.timer.elapsed_secs_as_float()).as_str());
        }
    }
}

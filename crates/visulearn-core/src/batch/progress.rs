//! Progress tracking for a generation batch.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifecycle of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchState {
    /// Created, no unit started.
    #[default]
    NotStarted,
    /// Units are being processed.
    Running,
    /// Every unit has been processed.
    Completed,
}

/// Completed-unit counter for one batch.
///
/// `completed` only moves forward, one step per processed unit, and never
/// exceeds `total`, which is fixed when the batch is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchProgress {
    completed: usize,
    total: usize,
    state: BatchState,
}

impl BatchProgress {
    /// Create a tracker for `total` units.
    pub const fn new(total: usize) -> Self {
        Self { completed: 0, total, state: BatchState::NotStarted }
    }

    /// Number of processed units.
    pub const fn completed(&self) -> usize {
        self.completed
    }

    /// Number of units in the batch.
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> BatchState {
        self.state
    }

    /// Moves to `Running`. An empty batch goes straight to `Completed`.
    pub fn start(&mut self) {
        if self.state == BatchState::NotStarted {
            self.state = if self.total == 0 { BatchState::Completed } else { BatchState::Running };
        }
    }

    /// Counts one more processed unit.
    ///
    /// Returns false, without changing anything, if the batch is not running.
    /// Reaching `total` completes the batch.
    pub fn advance(&mut self) -> bool {
        if self.state != BatchState::Running {
            return false;
        }
        self.completed += 1;
        if self.completed == self.total {
            self.state = BatchState::Completed;
        }
        true
    }

    /// Returns true once every unit has been processed.
    pub fn is_complete(&self) -> bool {
        self.state == BatchState::Completed
    }

    /// Get completion percentage.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.completed as f64 / self.total as f64) * 100.0
    }
}

/// Format duration as human-readable string.
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;

    if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else if total_secs == 0 {
        format!("{}ms", duration.as_millis())
    } else {
        format!("{}s", seconds)
    }
}

//! Progress reporting for generation batches.
//!
//! Events go out on a broadcast channel so any number of observers (a
//! progress bar, a log sink, a test) can follow a batch. The latest
//! [`BatchProgress`] is also kept in a watch channel for observers that only
//! care about the current position.

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::debug;
use visulearn_core::{BatchProgress, BatchSummary, UnitKind};

/// Progress event emitted while a batch runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Processing of the first unit is about to begin.
    BatchStarted {
        /// What the units are.
        kind: UnitKind,
        /// Number of units in the batch.
        total: usize,
    },
    /// A unit has been processed, whether or not its sub-tasks succeeded.
    UnitCompleted {
        /// Id of the processed unit.
        unit_id: u32,
        /// Progress after this unit.
        progress: BatchProgress,
        /// Sub-tasks of this unit that failed.
        failed_sub_tasks: usize,
    },
    /// Every unit has been processed.
    BatchCompleted {
        /// Final counts.
        summary: BatchSummary,
    },
}

/// Publishes progress events and the latest snapshot.
#[derive(Debug)]
pub struct ProgressReporter {
    /// Broadcast channel for events.
    broadcast_tx: broadcast::Sender<ProgressEvent>,
    /// Latest progress snapshot.
    snapshot_tx: watch::Sender<BatchProgress>,
}

impl ProgressReporter {
    /// Create a new progress reporter.
    pub fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(100);
        let (snapshot_tx, _) = watch::channel(BatchProgress::new(0));
        Self { broadcast_tx, snapshot_tx }
    }

    /// Subscribe to progress events.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.broadcast_tx.subscribe()
    }

    /// Watch the latest progress snapshot.
    pub fn watch(&self) -> watch::Receiver<BatchProgress> {
        self.snapshot_tx.subscribe()
    }

    /// Get current progress snapshot.
    pub fn snapshot(&self) -> BatchProgress {
        *self.snapshot_tx.borrow()
    }

    /// Emit batch started event.
    pub fn emit_batch_started(&self, kind: UnitKind, progress: BatchProgress) {
        self.publish(progress);
        self.emit(ProgressEvent::BatchStarted { kind, total: progress.total() });
    }

    /// Emit unit completed event.
    pub fn emit_unit_completed(&self, unit_id: u32, progress: BatchProgress, failed_sub_tasks: usize) {
        self.publish(progress);
        self.emit(ProgressEvent::UnitCompleted { unit_id, progress, failed_sub_tasks });
    }

    /// Emit batch completed event.
    pub fn emit_batch_completed(&self, summary: BatchSummary) {
        self.emit(ProgressEvent::BatchCompleted { summary });
    }

    fn publish(&self, progress: BatchProgress) {
        self.snapshot_tx.send_replace(progress);
    }

    fn emit(&self, event: ProgressEvent) {
        // No receivers is fine.
        let _ = self.broadcast_tx.send(event.clone());
        debug!("Progress event: {:?}", event);
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_events_reach_subscribers() {
        let reporter = ProgressReporter::new();
        let mut rx = reporter.subscribe();

        let mut progress = BatchProgress::new(1);
        progress.start();
        reporter.emit_batch_started(UnitKind::Comic, progress);
        progress.advance();
        reporter.emit_unit_completed(1, progress, 0);

        assert_eq!(rx.recv().await.unwrap(), ProgressEvent::BatchStarted { kind: UnitKind::Comic, total: 1 });
        match rx.recv().await.unwrap() {
            ProgressEvent::UnitCompleted { unit_id, progress, failed_sub_tasks } => {
                assert_eq!(unit_id, 1);
                assert_eq!(progress.completed(), 1);
                assert!(progress.is_complete());
                assert_eq!(failed_sub_tasks, 0);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_snapshot_tracks_latest_progress() {
        let reporter = ProgressReporter::new();
        let watcher = reporter.watch();
        assert_eq!(reporter.snapshot().total(), 0);

        let mut progress = BatchProgress::new(3);
        progress.start();
        reporter.emit_batch_started(UnitKind::Story, progress);
        progress.advance();
        reporter.emit_unit_completed(1, progress, 2);

        assert_eq!(reporter.snapshot().completed(), 1);
        assert_eq!(watcher.borrow().total(), 3);
    }

    #[test]
    fn test_emit_without_subscribers() {
        let reporter = ProgressReporter::default();
        reporter.emit_batch_completed(BatchSummary::from_units(&[], Duration::ZERO));
        assert_eq!(reporter.snapshot(), BatchProgress::new(0));
    }
}

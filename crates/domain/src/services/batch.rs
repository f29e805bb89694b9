//! Per-item failure isolation for batch runs.
//!
//! The renewal batch, the notification tick, and bulk import all share the
//! same contract: one item's failure is recorded and never aborts the
//! siblings. `BatchReport` is the accumulator those loops feed.

use serde::Serialize;
use uuid::Uuid;

/// One failed item with its id and error message.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemError {
    pub item_id: Uuid,
    pub message: String,
}

/// Accumulated outcome of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<BatchItemError>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successfully processed item.
    pub fn record_success(&mut self) {
        self.processed += 1;
        self.succeeded += 1;
    }

    /// Record a failed item without aborting the batch.
    pub fn record_failure(&mut self, item_id: Uuid, message: impl Into<String>) {
        self.processed += 1;
        self.failed += 1;
        self.errors.push(BatchItemError {
            item_id,
            message: message.into(),
        });
    }

    /// Whether every processed item succeeded.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

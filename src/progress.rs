//! Defines structures and types for progress reporting.

use std::sync::{Arc, Mutex};

/// Represents a snapshot of the progress during a long-running operation.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// A description of the current stage (e.g., "Looking up definitions").
    pub stage_description: String,
    /// Number of items processed in the current stage.
    pub current_item: u64,
    /// Total number of items expected in the current stage (if calculable).
    pub total_items: Option<u64>,
    /// An optional message providing more context (e.g., the word just looked up).
    pub message: Option<String>,
}

/// Type alias for the progress callback function.
///
/// The callback receives a `ProgressUpdate` and returns `true` to continue. The return value
/// is advisory: none of the stages can be cancelled midway.
pub type ProgressCallback = Box<dyn FnMut(ProgressUpdate) -> bool + Send + Sync>;

impl ProgressUpdate {
    pub fn new(
        stage_description: String,
        current_item: u64,
        total_items: Option<u64>,
        message: Option<String>,
    ) -> Self {
        ProgressUpdate {
            stage_description,
            current_item,
            total_items,
            message,
        }
    }

    /// Creates a new progress update for the start of a stage.
    pub fn new_stage(description: String, total_items: Option<u64>) -> Self {
        Self::new(description, 0, total_items, None)
    }
}

/// Cloneable handle that lets several stages (and threads) share one callback.
#[derive(Clone)]
pub struct ProgressReporter {
    callback: Arc<Mutex<ProgressCallback>>,
}

impl ProgressReporter {
    pub fn new(callback: ProgressCallback) -> Self {
        ProgressReporter {
            callback: Arc::new(Mutex::new(callback)),
        }
    }

    /// Forwards `update` to the callback. A poisoned lock drops the update.
    pub fn report(&self, update: ProgressUpdate) -> bool {
        match self.callback.lock() {
            Ok(mut cb) => cb(update),
            Err(_) => true,
        }
    }
}

/// Reports through an optional reporter; a no-op when there is none.
pub fn report_progress(reporter: Option<&ProgressReporter>, update: ProgressUpdate) {
    if let Some(reporter) = reporter {
        let _ = reporter.report(update);
    }
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter").finish_non_exhaustive()
    }
}

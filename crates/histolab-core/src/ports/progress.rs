//! Progress reporting port for batch runs.

use crate::domain::ImageReport;

/// Events emitted while a batch of images is processed.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Processing started for an image.
    Started {
        /// Path or sample name.
        path: String,
        /// Index in the batch (0-based).
        index: usize,
        /// Total images in batch, if known.
        total: Option<usize>,
    },
    /// Processing completed for an image.
    Completed {
        /// The finished report.
        report: Box<ImageReport>,
    },
    /// An image was skipped due to an error.
    Skipped {
        /// Path or sample name.
        path: String,
        /// Reason for skipping.
        reason: String,
    },
    /// All images have been processed.
    Finished {
        /// Images processed successfully.
        processed: usize,
        /// Images skipped.
        skipped: usize,
    },
}

/// Port for receiving progress events.
pub trait ProgressSink: Send + Sync {
    /// Called when a progress event occurs.
    fn on_event(&self, event: ProgressEvent);
}

//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the session core and external
//! adapters: where sample images come from, where reports go, and who hears
//! about batch progress.

mod progress;
mod report_output;
mod sample_catalog;

pub use progress::{ProgressEvent, ProgressSink};
pub use report_output::ReportOutput;
pub use sample_catalog::SampleCatalog;

//! Test support utilities for histolab.
//!
//! Provides mocks, synthetic image builders, and fixture helpers for testing
//! the transform engine, the session and the CLI.
//!
//! # Example
//!
//! ```
//! use histolab_test_support::{MockSampleCatalog, SyntheticImageBuilder};
//!
//! // Create synthetic test images
//! let ramp = SyntheticImageBuilder::horizontal_ramp(256, 4);
//! let flat = SyntheticImageBuilder::uniform_gray(16, 16, 128);
//!
//! // Serve them by name
//! let catalog = MockSampleCatalog::new(vec![("ramp.png", ramp), ("flat.png", flat)]);
//! ```

mod builders;
mod mocks;

pub use builders::{write_png, SyntheticImageBuilder};
pub use mocks::{MockProgressSink, MockReportOutput, MockSampleCatalog};

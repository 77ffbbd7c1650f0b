//! Core domain types for intensity processing.

mod error;
pub mod histogram;
mod image;
mod report;
mod transform;

pub use error::{Error, Result};
pub use histogram::{Histograms, BINS, MAX_INTENSITY};
pub use self::image::{ImageDimensions, IntensityImage};
pub use report::{HistogramSummary, ImageReport};
pub use transform::{Transform, TransformDefaults, TransformKind, MAX_SHIFT_BITS};

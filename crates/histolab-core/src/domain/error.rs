//! Error taxonomy for the image store, histograms and transform engine.

use thiserror::Error;

/// Errors raised by core operations.
///
/// Every failure is local and synchronous: it is returned to the immediate
/// caller and never leaves a session slot partially written.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// Input could not be read or decoded as an image.
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// The grid could not be encoded as PNG.
    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    /// Pixel access outside the current dimensions.
    #[error("pixel ({row}, {col}) is outside a {rows}x{cols} image")]
    OutOfRange {
        /// Requested row.
        row: u32,
        /// Requested column.
        col: u32,
        /// Image rows.
        rows: u32,
        /// Image columns.
        cols: u32,
    },

    /// A zero divisor: a zero scale factor or log base, or a zero-pixel image.
    #[error("division by zero in {operation}")]
    DivideByZero {
        /// The operation that would have divided by zero.
        operation: &'static str,
    },

    /// The lookup table has no spread to normalize against.
    #[error("lookup table maximum is zero, nothing to normalize against")]
    DegenerateRange,

    /// A transform parameter outside its usable domain.
    #[error("invalid parameter for {transform}: {reason}")]
    InvalidParameter {
        /// Transform name.
        transform: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// No sample with this name in the catalog.
    #[error("unknown sample image '{0}'")]
    UnknownSample(String),

    /// Text that does not name a session operation.
    #[error("invalid operation '{0}'")]
    InvalidOp(String),
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

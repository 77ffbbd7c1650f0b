//! Owned single-channel image store.

use std::io::Cursor;
use std::path::Path;

use image::{GrayImage, ImageFormat, Luma};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Error, Histograms, Result};

/// Image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageDimensions {
    /// Creates new dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// An 8-bit grayscale pixel grid together with its histograms.
///
/// The histograms are rebuilt on every change to the pixel data, so they are
/// never stale.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityImage {
    pixels: GrayImage,
    histograms: Histograms,
}

impl IntensityImage {
    /// Wraps an existing grid.
    #[must_use]
    pub fn from_luma(pixels: GrayImage) -> Self {
        let histograms = Histograms::build(&pixels);
        Self { pixels, histograms }
    }

    /// The 0x0 image.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_luma(GrayImage::new(0, 0))
    }

    /// A black image of `rows` x `cols`.
    #[must_use]
    pub fn zeroed(rows: u32, cols: u32) -> Self {
        Self::from_luma(GrayImage::new(cols, rows))
    }

    /// A black image with the dimensions of `other`.
    #[must_use]
    pub fn zeroed_like(other: &Self) -> Self {
        Self::zeroed(other.rows(), other.cols())
    }

    /// Decodes the image file at `path`, converting to luma.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the file cannot be read or decoded.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let decoded = image::open(path).map_err(Error::Decode)?;
        debug!(
            "Decoded {} ({}x{})",
            path.display(),
            decoded.width(),
            decoded.height()
        );
        Ok(Self::from_luma(decoded.into_luma8()))
    }

    /// Decodes an in-memory encoded image, converting to luma.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the bytes are not a supported image.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(bytes).map_err(Error::Decode)?;
        Ok(Self::from_luma(decoded.into_luma8()))
    }

    /// Number of rows (image height).
    #[must_use]
    pub fn rows(&self) -> u32 {
        self.pixels.height()
    }

    /// Number of columns (image width).
    #[must_use]
    pub fn cols(&self) -> u32 {
        self.pixels.width()
    }

    /// Pixel count, `rows * cols`.
    #[must_use]
    pub fn size(&self) -> u64 {
        u64::from(self.rows()) * u64::from(self.cols())
    }

    /// True for a zero-area image.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Width and height.
    #[must_use]
    pub fn dimensions(&self) -> ImageDimensions {
        ImageDimensions::new(self.cols(), self.rows())
    }

    /// Intensity at `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] outside the current dimensions.
    pub fn pixel(&self, row: u32, col: u32) -> Result<u8> {
        self.check_bounds(row, col)?;
        Ok(self.pixels.get_pixel(col, row).0[0])
    }

    /// Writes `intensity` at `(row, col)` and rebuilds the histograms.
    ///
    /// Each call rescans the whole grid; prefer building a full grid and
    /// wrapping it with [`Self::from_luma`] for bulk writes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] outside the current dimensions.
    pub fn set_pixel(&mut self, row: u32, col: u32, intensity: u8) -> Result<()> {
        self.check_bounds(row, col)?;
        self.pixels.put_pixel(col, row, Luma([intensity]));
        self.histograms = Histograms::build(&self.pixels);
        Ok(())
    }

    /// Histograms of the current pixels.
    #[must_use]
    pub fn histograms(&self) -> &Histograms {
        &self.histograms
    }

    /// Borrow the pixel grid for rendering.
    #[must_use]
    pub fn as_luma(&self) -> &GrayImage {
        &self.pixels
    }

    /// Row-major pixel values.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    /// Encodes the grid as grayscale PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if encoding fails.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Cursor::new(Vec::new());
        self.pixels
            .write_to(&mut bytes, ImageFormat::Png)
            .map_err(Error::Encode)?;
        Ok(bytes.into_inner())
    }

    fn check_bounds(&self, row: u32, col: u32) -> Result<()> {
        if row < self.rows() && col < self.cols() {
            Ok(())
        } else {
            Err(Error::OutOfRange {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
        }
    }
}

impl Default for IntensityImage {
    fn default() -> Self {
        Self::empty()
    }
}

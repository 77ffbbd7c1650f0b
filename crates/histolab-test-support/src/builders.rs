//! Synthetic image builders for testing.

use std::path::{Path, PathBuf};

use anyhow::Context;
use histolab_core::IntensityImage;
use image::{GrayImage, Luma};

/// Builder for creating synthetic grayscale test images.
///
/// Each method targets a histogram shape: flat, bimodal, uniform ramp,
/// narrow band, or pseudo-random.
pub struct SyntheticImageBuilder;

impl SyntheticImageBuilder {
    // === Flat and bimodal ===

    /// Every pixel set to `value`.
    #[must_use]
    pub fn uniform_gray(width: u32, height: u32, value: u8) -> IntensityImage {
        IntensityImage::from_luma(GrayImage::from_fn(width, height, |_, _| Luma([value])))
    }

    /// Black and white checkerboard with 8-pixel cells.
    #[must_use]
    pub fn checkerboard(width: u32, height: u32) -> IntensityImage {
        Self::checkerboard_with_cell_size(width, height, 8)
    }

    /// Checkerboard with custom cell size.
    #[must_use]
    pub fn checkerboard_with_cell_size(width: u32, height: u32, cell_size: u32) -> IntensityImage {
        let cell = cell_size.max(1);
        IntensityImage::from_luma(GrayImage::from_fn(width, height, |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        }))
    }

    // === Ramps ===

    /// Left-to-right ramp covering 0..=255 across the width.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn horizontal_ramp(width: u32, height: u32) -> IntensityImage {
        let span = width.saturating_sub(1).max(1);
        IntensityImage::from_luma(GrayImage::from_fn(width, height, |x, _| {
            // Safe: x <= span, so the quotient is at most 255
            Luma([((u32::from(u8::MAX) * x) / span) as u8])
        }))
    }

    /// Ramp confined to `low..=high`, a low-contrast image.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn narrow_range(width: u32, height: u32, low: u8, high: u8) -> IntensityImage {
        let (low, high) = (low.min(high), low.max(high));
        let range = u32::from(high - low);
        let span = width.saturating_sub(1).max(1);
        IntensityImage::from_luma(GrayImage::from_fn(width, height, |x, _| {
            // Safe: x * range / span <= range <= 255 - low
            Luma([low + ((x * range) / span) as u8])
        }))
    }

    // === Pseudo-random ===

    /// Deterministic noise from a linear congruential generator.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn noise(width: u32, height: u32, seed: u64) -> IntensityImage {
        let mut state = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
        let mut img = GrayImage::new(width, height);
        for pixel in img.pixels_mut() {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            // Safe: shifted down to the top 8 bits
            *pixel = Luma([(state >> 56) as u8]);
        }
        IntensityImage::from_luma(img)
    }

    // === Edge cases ===

    /// A 1x1 image.
    #[must_use]
    pub fn single_pixel(value: u8) -> IntensityImage {
        Self::uniform_gray(1, 1, value)
    }

    /// A 2x2 image, given row by row.
    #[must_use]
    pub fn tiny(values: [[u8; 2]; 2]) -> IntensityImage {
        let img = GrayImage::from_fn(2, 2, |x, y| {
            Luma([values[y as usize][x as usize]])
        });
        IntensityImage::from_luma(img)
    }
}

/// Encodes `image` as PNG into `dir/name` and returns the full path.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_png(dir: &Path, name: &str, image: &IntensityImage) -> anyhow::Result<PathBuf> {
    let path = dir.join(name);
    let bytes = image.encode_png()?;
    std::fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

//! Intensity transform engine.
//!
//! A transform request builds a lookup table over the 256 input intensities,
//! rescales it into the byte range and maps every source pixel through it
//! into a new image. The source is never modified.

mod lut;

pub use lut::Lut;

use tracing::debug;

use crate::domain::{IntensityImage, Result, Transform};

/// Applies `transform` to `source`, returning a new image of the same size.
///
/// [`Transform::Equalize`] reads the cumulative histogram of `source` itself.
///
/// # Errors
///
/// Returns the parameter errors of [`Lut::build`] and
/// [`crate::Error::DegenerateRange`] from [`Lut::normalize`].
pub fn apply_transform(source: &IntensityImage, transform: &Transform) -> Result<IntensityImage> {
    let mut lut = Lut::build(transform, source.histograms())?;
    debug!(
        "{transform}: raw range [{:.4}, {:.4}]",
        lut.min(),
        lut.max()
    );
    lut.normalize()?;

    let output = IntensityImage::from_luma(lut.apply(source.as_luma()));
    debug!(
        "{transform}: applied to {}x{} image",
        output.cols(),
        output.rows()
    );
    Ok(output)
}

/// Equalizes `image` against its own cumulative histogram.
///
/// # Errors
///
/// Returns [`crate::Error::DegenerateRange`] for a zero-area image.
pub fn equalize(image: &IntensityImage) -> Result<IntensityImage> {
    apply_transform(image, &Transform::Equalize)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::cast_possible_truncation)]
mod tests {
    use image::{GrayImage, Luma};

    use super::*;
    use crate::domain::Error;

    fn tiny() -> IntensityImage {
        let mut grid = GrayImage::new(2, 2);
        grid.put_pixel(0, 0, Luma([0]));
        grid.put_pixel(1, 0, Luma([128]));
        grid.put_pixel(0, 1, Luma([255]));
        grid.put_pixel(1, 1, Luma([64]));
        IntensityImage::from_luma(grid)
    }

    #[test]
    fn test_negative_on_tiny_image() {
        let out = apply_transform(&tiny(), &Transform::Negative).expect("negative");
        assert_eq!(out.as_raw(), &[255, 127, 0, 191]);
    }

    #[test]
    fn test_source_is_untouched() {
        let src = tiny();
        let before = src.clone();
        let _ = apply_transform(&src, &Transform::PowerLaw { gamma: 2.0 }).expect("power");
        assert_eq!(src, before);
    }

    #[test]
    fn test_output_histograms_are_rebuilt() {
        let out = apply_transform(&tiny(), &Transform::Negative).expect("negative");
        let dist = out.histograms().distribution();
        assert_eq!(dist[255], 1);
        assert_eq!(dist[127], 1);
        assert_eq!(dist[0], 1);
        assert_eq!(dist[191], 1);
    }

    #[test]
    fn test_zero_factor_fails() {
        let err = apply_transform(&tiny(), &Transform::ScaleDown { factor: 0.0 })
            .expect_err("zero factor");
        assert!(matches!(err, Error::DivideByZero { .. }));
    }

    #[test]
    fn test_equalize_spreads_narrow_range() {
        let src = IntensityImage::from_luma(GrayImage::from_fn(64, 4, |x, _| {
            Luma([100 + (x / 8) as u8])
        }));
        let out = equalize(&src).expect("equalize");

        let hist = out.histograms();
        assert_eq!(hist.max_intensity(), Some(255));
        assert!(hist.min_intensity().unwrap_or(255) < 100);
    }

    #[test]
    fn test_equalize_empty_image_is_degenerate() {
        let err = equalize(&IntensityImage::empty()).expect_err("nothing to equalize");
        assert!(matches!(err, Error::DegenerateRange));
    }
}

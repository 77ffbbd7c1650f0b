//! 256-entry lookup tables.

use image::{GrayImage, Luma};

use crate::domain::{Error, Histograms, Result, Transform, BINS, MAX_INTENSITY};

/// Per-intensity mapping built for a single transform request.
#[derive(Debug, Clone, PartialEq)]
pub struct Lut {
    values: [f64; BINS],
    low: f64,
    high: f64,
}

impl Lut {
    /// Evaluates `transform` at every input intensity.
    ///
    /// `reference` supplies the cumulative mapping for [`Transform::Equalize`];
    /// other transforms ignore it.
    ///
    /// # Errors
    ///
    /// Propagates [`Transform::validate`] failures and returns
    /// [`Error::InvalidParameter`] if any entry is not finite.
    #[allow(clippy::cast_possible_truncation)]
    pub fn build(transform: &Transform, reference: &Histograms) -> Result<Self> {
        transform.validate()?;

        let mut values = [0.0; BINS];
        let mut low = f64::INFINITY;
        let mut high = f64::NEG_INFINITY;

        for (i, slot) in values.iter_mut().enumerate() {
            // Safe: i is a bin index, always 0-255
            let raw = transform.evaluate(i as u8, reference);
            if !raw.is_finite() {
                return Err(Error::InvalidParameter {
                    transform: transform.kind().name(),
                    reason: format!("entry for intensity {i} evaluates to {raw}"),
                });
            }
            low = low.min(raw);
            high = high.max(raw);
            *slot = raw;
        }

        Ok(Self {
            values,
            low,
            high,
        })
    }

    /// Rescales every entry so the raw range maps onto `[0, 255]`.
    ///
    /// Uses `255 / max * (raw - min)`, so a table whose minimum is
    /// above zero does not reach full white.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DegenerateRange`] when the raw maximum is zero.
    pub fn normalize(&mut self) -> Result<()> {
        if self.high == 0.0 {
            return Err(Error::DegenerateRange);
        }
        let scale = f64::from(MAX_INTENSITY) / self.high;
        for value in &mut self.values {
            *value = scale * (*value - self.low);
        }
        self.low = self.values.iter().copied().fold(f64::INFINITY, f64::min);
        self.high = self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Ok(())
    }

    /// Current entries.
    #[must_use]
    pub fn values(&self) -> &[f64; BINS] {
        &self.values
    }

    /// Smallest entry.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.low
    }

    /// Largest entry.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.high
    }

    /// Output intensity for `intensity`, rounded and clamped to 8 bits.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn map(&self, intensity: u8) -> u8 {
        let value = self.values[usize::from(intensity)].round();
        value.clamp(0.0, f64::from(MAX_INTENSITY)) as u8
    }

    /// Writes the mapped value of every `source` pixel into a new grid of the
    /// same dimensions.
    #[must_use]
    pub fn apply(&self, source: &GrayImage) -> GrayImage {
        let mut output = GrayImage::new(source.width(), source.height());
        for (col, row, pixel) in source.enumerate_pixels() {
            output.put_pixel(col, row, Luma([self.map(pixel.0[0])]));
        }
        output
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_lut_is_identity_after_normalize() {
        let mut lut = Lut::build(&Transform::Positive, &Histograms::empty()).expect("build");
        lut.normalize().expect("normalize");
        for i in 0..=255u8 {
            assert_eq!(lut.map(i), i);
        }
    }

    #[test]
    fn test_build_tracks_raw_range() {
        let lut = Lut::build(&Transform::ScaleUp { factor: 3.0 }, &Histograms::empty())
            .expect("build");
        assert_eq!(lut.min(), 0.0);
        assert_eq!(lut.max(), 765.0);
    }

    #[test]
    fn test_normalize_rescales_into_byte_range() {
        let mut lut = Lut::build(&Transform::ScaleUp { factor: 10.0 }, &Histograms::empty())
            .expect("build");
        lut.normalize().expect("normalize");
        assert!(lut.values().iter().all(|&v| (0.0..=255.0).contains(&v)));
        assert_eq!(lut.map(255), 255);
        assert_eq!(lut.map(0), 0);
    }

    #[test]
    fn test_exponential_keeps_offset_formula() {
        let mut lut = Lut::build(&Transform::Exponential, &Histograms::empty()).expect("build");
        assert!((lut.min() - 1.0).abs() < 1e-12);
        lut.normalize().expect("normalize");

        // (255 / e) * (e - 1) ~= 161.2
        assert_eq!(lut.map(0), 0);
        assert_eq!(lut.map(255), 161);
    }

    #[test]
    fn test_degenerate_range() {
        let mut lut = Lut::build(&Transform::BitShiftRight { bits: 8 }, &Histograms::empty())
            .expect("build");
        assert_eq!(lut.max(), 0.0);
        assert!(matches!(lut.normalize(), Err(Error::DegenerateRange)));
    }

    #[test]
    fn test_non_finite_entries_rejected() {
        let err = Lut::build(&Transform::PowerLaw { gamma: -1.0 }, &Histograms::empty())
            .expect_err("0^-1 is infinite");
        assert!(matches!(err, Error::InvalidParameter { transform: "power", .. }));
    }

    #[test]
    fn test_build_validates_first() {
        let err = Lut::build(&Transform::ScaleDown { factor: 0.0 }, &Histograms::empty())
            .expect_err("zero factor");
        assert!(matches!(err, Error::DivideByZero { .. }));
    }

    #[test]
    fn test_apply_keeps_dimensions() {
        let mut lut = Lut::build(&Transform::Negative, &Histograms::empty()).expect("build");
        lut.normalize().expect("normalize");
        let src = GrayImage::from_fn(5, 3, |x, y| Luma([u8::try_from(x * 3 + y).unwrap_or(0)]));
        let out = lut.apply(&src);
        assert_eq!(out.dimensions(), (5, 3));
        assert_eq!(out.get_pixel(0, 0).0[0], 255);
        assert_eq!(out.get_pixel(4, 2).0[0], 255 - 14);
    }
}

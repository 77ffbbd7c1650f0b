//! Histogram statistics for 8-bit grayscale images.
//!
//! Six 256-bin vectors are derived from a pixel grid in one go: the bin
//! labels, the raw distribution, its PDF and CDF, the equalization transform
//! (CDF scaled to the intensity range) and the distribution the image would
//! have after equalization. They are always rebuilt wholesale.

use image::GrayImage;
use serde::{Deserialize, Serialize};

use super::{Error, Result};

/// Number of intensity bins.
pub const BINS: usize = 256;

/// Largest representable intensity.
pub const MAX_INTENSITY: u8 = u8::MAX;

/// The six histogram vectors of one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histograms {
    bins: Vec<u8>,
    distribution: Vec<u64>,
    pdf: Vec<f64>,
    cdf: Vec<f64>,
    transform: Vec<f64>,
    equalized: Vec<u64>,
}

impl Histograms {
    /// Compute every vector from a grayscale grid.
    ///
    /// A zero-area grid is a valid state: its distribution is all zeros and so
    /// are the PDF-derived vectors.
    #[must_use]
    pub fn build(image: &GrayImage) -> Self {
        let bins = build_bins();
        let distribution = build_distribution(image);
        let total = u64::from(image.width()) * u64::from(image.height());

        let Ok(pdf) = build_pdf(&distribution, total) else {
            return Self {
                bins,
                distribution,
                pdf: vec![0.0; BINS],
                cdf: vec![0.0; BINS],
                transform: vec![0.0; BINS],
                equalized: vec![0; BINS],
            };
        };
        let cdf = build_cdf(&pdf);
        let transform = build_transform(&cdf);
        let equalized = build_equalized(image, &transform);

        Self {
            bins,
            distribution,
            pdf,
            cdf,
            transform,
            equalized,
        }
    }

    /// Histograms of a 0x0 image.
    #[must_use]
    pub fn empty() -> Self {
        Self::build(&GrayImage::new(0, 0))
    }

    /// Bin labels, `bins()[i] == i`.
    #[must_use]
    pub fn bins(&self) -> &[u8] {
        &self.bins
    }

    /// Pixel count per intensity.
    #[must_use]
    pub fn distribution(&self) -> &[u64] {
        &self.distribution
    }

    /// Per-bin probability.
    #[must_use]
    pub fn pdf(&self) -> &[f64] {
        &self.pdf
    }

    /// Running sum of the PDF.
    #[must_use]
    pub fn cdf(&self) -> &[f64] {
        &self.cdf
    }

    /// Equalization mapping, `cdf * 255`.
    #[must_use]
    pub fn transform(&self) -> &[f64] {
        &self.transform
    }

    /// Distribution after remapping every pixel through [`Self::transform`].
    #[must_use]
    pub fn equalized(&self) -> &[u64] {
        &self.equalized
    }

    /// Returns the total pixel count.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.distribution.iter().sum()
    }

    /// Lowest occupied bin.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn min_intensity(&self) -> Option<u8> {
        // Safe: position is a bin index, always 0-255
        self.distribution
            .iter()
            .position(|&count| count > 0)
            .map(|i| i as u8)
    }

    /// Highest occupied bin.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn max_intensity(&self) -> Option<u8> {
        self.distribution
            .iter()
            .rposition(|&count| count > 0)
            .map(|i| i as u8)
    }

    /// Calculate percentile value (0.0-1.0 → intensity 0-255).
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    #[must_use]
    pub fn percentile(&self, p: f64) -> u8 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        let target = (total as f64 * p.clamp(0.0, 1.0)).round() as u64;
        let mut cumulative = 0u64;
        for (i, &count) in self.distribution.iter().enumerate() {
            cumulative += count;
            if cumulative >= target {
                return i as u8;
            }
        }
        MAX_INTENSITY
    }

    /// Calculate mean intensity.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let sum: u64 = self
            .distribution
            .iter()
            .enumerate()
            .map(|(i, &count)| (i as u64) * count)
            .sum();
        sum as f64 / total as f64
    }

    /// Calculate standard deviation of intensity.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn std_dev(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let mean = self.mean();
        let variance: f64 = self
            .distribution
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                let diff = (i as f64) - mean;
                diff * diff * (count as f64)
            })
            .sum::<f64>()
            / (total as f64);
        variance.sqrt()
    }
}

impl Default for Histograms {
    fn default() -> Self {
        Self::empty()
    }
}

/// Identity labels 0..=255.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn build_bins() -> Vec<u8> {
    (0..BINS).map(|i| i as u8).collect()
}

/// Count pixels per intensity in a single scan.
#[must_use]
pub fn build_distribution(image: &GrayImage) -> Vec<u64> {
    let mut distribution = vec![0u64; BINS];
    for pixel in image.pixels() {
        distribution[usize::from(pixel.0[0])] += 1;
    }
    distribution
}

/// Divide each bucket by the total pixel count.
///
/// # Errors
///
/// Returns [`Error::DivideByZero`] when `total` is zero.
#[allow(clippy::cast_precision_loss)]
pub fn build_pdf(distribution: &[u64], total: u64) -> Result<Vec<f64>> {
    if total == 0 {
        return Err(Error::DivideByZero { operation: "pdf" });
    }
    let total = total as f64;
    Ok(distribution
        .iter()
        .map(|&count| count as f64 / total)
        .collect())
}

/// Prefix sum over the PDF.
#[must_use]
pub fn build_cdf(pdf: &[f64]) -> Vec<f64> {
    pdf.iter()
        .scan(0.0, |running, &p| {
            *running += p;
            Some(*running)
        })
        .collect()
}

/// Scale the CDF onto the intensity range.
#[must_use]
pub fn build_transform(cdf: &[f64]) -> Vec<f64> {
    let scale = f64::from(MAX_INTENSITY);
    cdf.iter().map(|&c| c * scale).collect()
}

/// Recount pixels by their transform-mapped bin.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn build_equalized(image: &GrayImage, transform: &[f64]) -> Vec<u64> {
    let mut equalized = vec![0u64; BINS];
    for pixel in image.pixels() {
        // Truncation matches how the mapped value is binned; min() absorbs
        // a CDF that rounds a hair above 1.0
        let bin = (transform[usize::from(pixel.0[0])] as usize).min(BINS - 1);
        equalized[bin] += 1;
    }
    equalized
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::cast_possible_truncation)]
mod tests {
    use super::*;

    fn ramp() -> GrayImage {
        GrayImage::from_fn(256, 1, |x, _| image::Luma([x as u8]))
    }

    #[test]
    fn test_bins_are_identity() {
        let hist = Histograms::build(&ramp());
        for (i, &bin) in hist.bins().iter().enumerate() {
            assert_eq!(usize::from(bin), i);
        }
        assert_eq!(hist.bins().len(), BINS);
    }

    #[test]
    fn test_distribution_sums_to_pixel_count() {
        let img = GrayImage::from_fn(37, 11, |x, y| image::Luma([((x * 7 + y * 13) % 256) as u8]));
        let hist = Histograms::build(&img);
        assert_eq!(hist.total(), 37 * 11);
        assert_eq!(hist.distribution().iter().sum::<u64>(), 37 * 11);
    }

    #[test]
    fn test_cdf_monotone_and_ends_at_one() {
        let img = GrayImage::from_fn(64, 64, |x, y| image::Luma([((x * y) % 251) as u8]));
        let hist = Histograms::build(&img);

        for window in hist.cdf().windows(2) {
            assert!(window[1] >= window[0], "cdf must be non-decreasing");
        }
        let last = hist.cdf()[BINS - 1];
        assert!((last - 1.0).abs() < 1e-6, "cdf[255] should be 1.0, got {last}");
    }

    #[test]
    fn test_transform_is_scaled_cdf() {
        let hist = Histograms::build(&ramp());
        for (t, c) in hist.transform().iter().zip(hist.cdf()) {
            assert!((t - c * 255.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_equalized_preserves_pixel_count() {
        let img = GrayImage::from_fn(50, 20, |x, _| image::Luma([(x % 10) as u8 * 3]));
        let hist = Histograms::build(&img);
        assert_eq!(hist.equalized().iter().sum::<u64>(), 1000);
    }

    #[test]
    fn test_uniform_image_equalizes_to_top_bin() {
        let img = GrayImage::from_fn(10, 10, |_, _| image::Luma([42u8]));
        let hist = Histograms::build(&img);

        assert_eq!(hist.distribution()[42], 100);
        assert!((hist.cdf()[41] - 0.0).abs() < f64::EPSILON);
        assert!((hist.cdf()[42] - 1.0).abs() < 1e-12);
        assert_eq!(hist.equalized()[255], 100);
    }

    #[test]
    fn test_empty_image_histograms() {
        let hist = Histograms::empty();
        assert_eq!(hist.total(), 0);
        assert!(hist.pdf().iter().all(|&p| p == 0.0));
        assert!(hist.cdf().iter().all(|&c| c == 0.0));
        assert_eq!(hist.min_intensity(), None);
        assert_eq!(hist.max_intensity(), None);
        assert_eq!(hist.percentile(0.5), 0);
        assert!((hist.mean() - 0.0).abs() < f64::EPSILON);
        assert!((hist.std_dev() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pdf_rejects_zero_total() {
        let distribution = vec![0u64; BINS];
        let err = build_pdf(&distribution, 0).expect_err("zero total must fail");
        assert!(matches!(err, Error::DivideByZero { operation: "pdf" }));
    }

    #[test]
    fn test_min_max_intensity() {
        let img = GrayImage::from_fn(4, 1, |x, _| image::Luma([[12u8, 200, 90, 12][x as usize]]));
        let hist = Histograms::build(&img);
        assert_eq!(hist.min_intensity(), Some(12));
        assert_eq!(hist.max_intensity(), Some(200));
    }

    #[test]
    fn test_percentiles_on_ramp() {
        let img = GrayImage::from_fn(256, 100, |x, _| image::Luma([x as u8]));
        let hist = Histograms::build(&img);

        let p50 = hist.percentile(0.5);
        assert!(p50 > 120 && p50 < 136, "p50 should be ~128, got {p50}");
        assert_eq!(hist.percentile(0.0), 0);
        assert_eq!(hist.percentile(1.0), 255);
    }

    #[test]
    fn test_mean_and_std_dev_of_constant() {
        let img = GrayImage::from_fn(8, 8, |_, _| image::Luma([128u8]));
        let hist = Histograms::build(&img);
        assert!((hist.mean() - 128.0).abs() < 1e-9);
        assert!(hist.std_dev().abs() < 1e-9);
    }
}

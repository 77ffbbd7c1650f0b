//! Per-image report types.

use serde::{Deserialize, Serialize};

use super::{Histograms, ImageDimensions, IntensityImage};

/// Complete report for one processed image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageReport {
    /// Source path or sample name.
    pub path: String,
    /// Timestamp of processing (ISO 8601).
    pub timestamp: String,
    /// Image dimensions.
    pub dimensions: ImageDimensions,
    /// Operations applied, in order.
    pub operations: Vec<String>,
    /// Statistics of the input slot.
    pub input: HistogramSummary,
    /// Statistics of the output slot.
    pub output: HistogramSummary,
}

/// Descriptive statistics of one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramSummary {
    /// Mean intensity.
    pub mean: f64,
    /// Standard deviation of intensity.
    pub std_dev: f64,
    /// Lowest occupied bin.
    pub min: Option<u8>,
    /// Highest occupied bin.
    pub max: Option<u8>,
    /// 5th percentile intensity.
    pub p5: u8,
    /// Median intensity.
    pub p50: u8,
    /// 95th percentile intensity.
    pub p95: u8,
    /// The six histogram vectors, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub histograms: Option<Histograms>,
}

impl HistogramSummary {
    /// Summarize an image, optionally embedding its full histograms.
    #[must_use]
    pub fn of(image: &IntensityImage, include_histograms: bool) -> Self {
        let hist = image.histograms();
        Self {
            mean: hist.mean(),
            std_dev: hist.std_dev(),
            min: hist.min_intensity(),
            max: hist.max_intensity(),
            p5: hist.percentile(0.05),
            p50: hist.percentile(0.5),
            p95: hist.percentile(0.95),
            histograms: include_histograms.then(|| hist.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_of_constant_image() {
        let img = IntensityImage::from_luma(image::GrayImage::from_fn(4, 4, |_, _| {
            image::Luma([77u8])
        }));
        let summary = HistogramSummary::of(&img, false);

        assert!((summary.mean - 77.0).abs() < 1e-9);
        assert_eq!(summary.min, Some(77));
        assert_eq!(summary.max, Some(77));
        assert_eq!(summary.p50, 77);
        assert!(summary.histograms.is_none());
    }

    #[test]
    fn test_summary_embeds_histograms_on_request() {
        let img = IntensityImage::zeroed(2, 3);
        let summary = HistogramSummary::of(&img, true);
        let hist = summary.histograms.unwrap_or_default();
        assert_eq!(hist.distribution()[0], 6);
    }
}

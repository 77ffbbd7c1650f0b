//! Mock implementations of core port traits.

use std::sync::{Arc, Mutex, PoisonError};

use histolab_core::ports::{ProgressEvent, ProgressSink, ReportOutput, SampleCatalog};
use histolab_core::{ImageReport, IntensityImage};

/// Mock implementation of `SampleCatalog` for testing.
///
/// Serves pre-encoded PNG samples by name and counts lookups.
pub struct MockSampleCatalog {
    samples: Vec<(String, Vec<u8>)>,
    lookup_count: Arc<Mutex<usize>>,
}

impl MockSampleCatalog {
    /// Creates a catalog from named images, PNG-encoding each.
    ///
    /// Images that fail to encode are served as empty byte buffers.
    #[must_use]
    pub fn new(samples: Vec<(&str, IntensityImage)>) -> Self {
        let samples = samples
            .into_iter()
            .map(|(name, image)| (name.to_string(), image.encode_png().unwrap_or_default()))
            .collect();
        Self::from_bytes(samples)
    }

    /// Creates a catalog serving raw byte buffers as-is.
    #[must_use]
    pub fn from_bytes(samples: Vec<(String, Vec<u8>)>) -> Self {
        Self {
            samples,
            lookup_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates an empty catalog.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_bytes(vec![])
    }

    /// Returns the number of `bytes()` calls.
    #[must_use]
    pub fn lookup_count(&self) -> usize {
        *self
            .lookup_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl SampleCatalog for MockSampleCatalog {
    fn names(&self) -> Vec<String> {
        self.samples.iter().map(|(name, _)| name.clone()).collect()
    }

    fn bytes(&self, name: &str) -> anyhow::Result<Vec<u8>> {
        if let Ok(mut c) = self.lookup_count.lock() {
            *c += 1;
        }
        self.samples
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| anyhow::anyhow!("no sample named '{name}'"))
    }
}

/// Mock implementation of `ReportOutput` for testing.
///
/// Captures reports for later assertions.
pub struct MockReportOutput {
    reports: Arc<Mutex<Vec<ImageReport>>>,
    flush_count: Arc<Mutex<usize>>,
}

impl MockReportOutput {
    /// Creates a new mock output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reports: Arc::new(Mutex::new(Vec::new())),
            flush_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Returns all captured reports.
    #[must_use]
    pub fn reports(&self) -> Vec<ImageReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of times `flush()` was called.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        *self
            .flush_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockReportOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportOutput for MockReportOutput {
    fn write(&self, report: &ImageReport) -> anyhow::Result<()> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.clone());
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        if let Ok(mut c) = self.flush_count.lock() {
            *c += 1;
        }
        Ok(())
    }
}

/// Mock implementation of `ProgressSink` for testing.
///
/// Captures events for later assertions.
pub struct MockProgressSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl MockProgressSink {
    /// Creates a new mock progress sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of `Started` events.
    #[must_use]
    pub fn started_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Started { .. }))
    }

    /// Returns the number of `Completed` events.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Completed { .. }))
    }

    /// Returns the number of `Skipped` events.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Skipped { .. }))
    }

    /// Returns the final counts from the `Finished` event, if any.
    #[must_use]
    pub fn finished_counts(&self) -> Option<(usize, usize)> {
        self.events().iter().find_map(|e| match e {
            ProgressEvent::Finished { processed, skipped } => Some((*processed, *skipped)),
            _ => None,
        })
    }

    fn count(&self, pred: impl Fn(&ProgressEvent) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }
}

impl Default for MockProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use histolab_core::{HistogramSummary, ImageDimensions};

    use super::*;
    use crate::SyntheticImageBuilder;

    #[test]
    fn test_mock_catalog_serves_images() {
        let catalog =
            MockSampleCatalog::new(vec![("flat.png", SyntheticImageBuilder::uniform_gray(4, 4, 9))]);

        assert_eq!(catalog.names(), ["flat.png"]);
        let img = catalog.load("flat.png").unwrap();
        assert_eq!(img.histograms().distribution()[9], 16);
        assert_eq!(catalog.lookup_count(), 1);
    }

    #[test]
    fn test_mock_catalog_unknown_name() {
        let catalog = MockSampleCatalog::empty();
        assert!(catalog.bytes("missing.png").is_err());
        assert!(catalog.load("missing.png").is_err());
    }

    #[test]
    fn test_mock_report_output() {
        let output = MockReportOutput::new();
        let image = SyntheticImageBuilder::uniform_gray(2, 2, 1);

        let report = ImageReport {
            path: "test.png".into(),
            timestamp: "2024-01-01T00:00:00Z".into(),
            dimensions: ImageDimensions::new(2, 2),
            operations: vec!["negative".into()],
            input: HistogramSummary::of(&image, false),
            output: HistogramSummary::of(&image, false),
        };

        output.write(&report).unwrap();
        output.flush().unwrap();

        assert_eq!(output.reports().len(), 1);
        assert_eq!(output.reports()[0].path, "test.png");
        assert_eq!(output.flush_count(), 1);
    }

    #[test]
    fn test_mock_progress_sink() {
        let sink = MockProgressSink::new();

        sink.on_event(ProgressEvent::Started {
            path: "test.png".into(),
            index: 0,
            total: Some(1),
        });
        sink.on_event(ProgressEvent::Skipped {
            path: "test.png".into(),
            reason: "corrupt".into(),
        });
        sink.on_event(ProgressEvent::Finished {
            processed: 0,
            skipped: 1,
        });

        assert_eq!(sink.started_count(), 1);
        assert_eq!(sink.skipped_count(), 1);
        assert_eq!(sink.completed_count(), 0);
        assert_eq!(sink.finished_counts(), Some((0, 1)));
    }
}

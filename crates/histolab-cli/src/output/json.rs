//! JSON report output adapter.

use std::io::{self, Write};
use std::sync::Mutex;

use anyhow::Result;
use histolab_core::{ImageReport, ReportOutput};

/// Writes reports as JSON Lines, or as one JSON array in [array mode](JsonOutput::array).
pub struct JsonOutput {
    writer: Mutex<Box<dyn Write + Send>>,
    array: Option<ArrayMode>,
}

/// Reports held back until the next flush.
struct ArrayMode {
    pretty: bool,
    pending: Mutex<Vec<ImageReport>>,
}

impl JsonOutput {
    /// Creates a new JSON output writing to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Creates a new JSON output writing to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
            array: None,
        }
    }

    /// Switches to array mode: reports are collected and each flush writes
    /// the ones gathered since the previous flush as a single JSON array.
    #[must_use]
    pub fn array(mut self, pretty: bool) -> Self {
        self.array = Some(ArrayMode {
            pretty,
            pending: Mutex::new(Vec::new()),
        });
        self
    }

    #[allow(clippy::significant_drop_tightening)]
    fn write_line(&self, json: &str) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writeln!(writer, "{json}")?;
        Ok(())
    }
}

impl ReportOutput for JsonOutput {
    fn write(&self, report: &ImageReport) -> Result<()> {
        if let Some(array) = &self.array {
            array
                .pending
                .lock()
                .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?
                .push(report.clone());
            return Ok(());
        }
        self.write_line(&serde_json::to_string(report)?)
    }

    #[allow(clippy::significant_drop_tightening)]
    fn flush(&self) -> Result<()> {
        if let Some(array) = &self.array {
            let reports = std::mem::take(
                &mut *array
                    .pending
                    .lock()
                    .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?,
            );
            let json = if array.pretty {
                serde_json::to_string_pretty(&reports)?
            } else {
                serde_json::to_string(&reports)?
            };
            self.write_line(&json)?;
        }
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, PoisonError};

    use histolab_core::{HistogramSummary, ImageDimensions, IntensityImage};

    use super::*;

    /// Shared buffer so the test can read what the output wrote.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn report(path: &str) -> ImageReport {
        let image = IntensityImage::zeroed(2, 2);
        ImageReport {
            path: path.into(),
            timestamp: "2024-01-01T00:00:00Z".into(),
            dimensions: ImageDimensions::new(2, 2),
            operations: vec!["negative".into()],
            input: HistogramSummary::of(&image, false),
            output: HistogramSummary::of(&image, false),
        }
    }

    #[test]
    fn test_jsonl_one_object_per_line() {
        let buf = SharedBuf::default();
        let output = JsonOutput::new(Box::new(buf.clone()));
        output.write(&report("a.png")).unwrap();
        output.write(&report("b.png")).unwrap();
        output.flush().unwrap();

        let text = buf.contents();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["path"], "a.png");
        assert_eq!(first["operations"][0], "negative");
        assert!(first["input"].get("histograms").is_none());
    }

    #[test]
    fn test_array_output() {
        let buf = SharedBuf::default();
        let output = JsonOutput::new(Box::new(buf.clone())).array(true);
        output.write(&report("a.png")).unwrap();
        output.write(&report("b.png")).unwrap();
        assert!(buf.contents().is_empty(), "nothing is written before flush");

        output.flush().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&buf.contents()).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[1]["dimensions"]["width"], 2);
    }

    #[test]
    fn test_empty_array_on_flush() {
        let buf = SharedBuf::default();
        let output = JsonOutput::new(Box::new(buf.clone())).array(false);
        output.flush().unwrap();
        assert_eq!(buf.contents().trim(), "[]");
    }
}

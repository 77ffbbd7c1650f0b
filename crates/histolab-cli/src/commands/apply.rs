//! Apply command - run session operations on images and report histograms.

use std::collections::HashSet;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use histolab_adapters::{fs::load_image, samples_dir, save_slots, FsImageSource, LayeredSamples};
use histolab_core::domain::MAX_SHIFT_BITS;
use histolab_core::{
    HistogramSummary, ImageReport, IntensityImage, ProgressEvent, ProgressSink, ReportOutput,
    SampleCatalog, Session, SessionOp, TransformDefaults,
};
use tracing::{debug, info};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{JsonOutput, ProgressBar};

/// Output format for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON Lines (one JSON object per line)
    #[default]
    Jsonl,
    /// Single JSON array
    Json,
}

/// Parse a finite floating-point parameter.
fn parse_finite(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("{value} is not a finite number"))
    }
}

/// Shared arguments for running operations.
#[derive(Args, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct ApplyArgs {
    /// Image files or directories to process
    pub paths: Vec<PathBuf>,

    /// Process a named sample image (repeatable)
    #[arg(long = "sample", value_name = "NAME")]
    pub samples: Vec<String>,

    /// Comma-separated operations, e.g. `undo,power=0.5,copy,equalize`
    #[arg(long, value_name = "LIST")]
    pub ops: Option<String>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Save the input, buffer and output slots as PNG into this directory
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,

    /// Embed the six histogram vectors in each report
    #[arg(long)]
    pub histograms: bool,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Default bit-shift amount
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_SHIFT_BITS)))]
    pub shift_bits: Option<u32>,

    /// Default scale-up / scale-down factor
    #[arg(long, value_name = "F", value_parser = parse_finite)]
    pub scale_factor: Option<f64>,

    /// Default power-law exponent
    #[arg(long, value_name = "G", value_parser = parse_finite)]
    pub gamma: Option<f64>,

    /// Default base-log base
    #[arg(long, value_name = "B", value_parser = parse_finite)]
    pub log_base: Option<f64>,

    /// Custom samples directory (overrides default and config)
    #[arg(long, value_name = "DIR")]
    pub samples_dir: Option<PathBuf>,
}

impl ApplyArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }

        args.shift_bits = args.shift_bits.or(config.transform.shift_bits);
        args.scale_factor = args.scale_factor.or(config.transform.scale_factor);
        args.gamma = args.gamma.or(config.transform.gamma);
        args.log_base = args.log_base.or(config.transform.log_base);

        if args.samples_dir.is_none() {
            args.samples_dir.clone_from(&config.samples.dir);
        }
        if args.out_dir.is_none() {
            args.out_dir.clone_from(&config.output.dir);
        }

        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_deref()
                .and_then(|s| match s {
                    "json" => Some(OutputFormat::Json),
                    "jsonl" => Some(OutputFormat::Jsonl),
                    _ => None,
                });
        }

        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }
        if !args.histograms {
            args.histograms = config.output.histograms.unwrap_or(false);
        }

        args
    }

    /// Whether any file or sample input was given.
    #[must_use]
    pub fn has_inputs(&self) -> bool {
        !self.paths.is_empty() || !self.samples.is_empty()
    }

    /// Transform parameters with fallback to hardcoded defaults.
    fn transform_defaults(&self) -> TransformDefaults {
        let fallback = TransformDefaults::default();
        TransformDefaults {
            shift_bits: self.shift_bits.unwrap_or(fallback.shift_bits),
            scale_factor: self.scale_factor.unwrap_or(fallback.scale_factor),
            gamma: self.gamma.unwrap_or(fallback.gamma),
            log_base: self.log_base.unwrap_or(fallback.log_base),
        }
    }

    /// Get output format with fallback to JSONL.
    fn format(&self) -> OutputFormat {
        self.format.unwrap_or(OutputFormat::Jsonl)
    }
}

/// Result of running the apply command.
#[allow(dead_code)] // Fields exposed for programmatic use
pub struct ApplyResult {
    /// Number of images processed.
    pub processed: usize,
    /// Number of images skipped.
    pub skipped: usize,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// One image to process.
enum Input {
    File(PathBuf),
    Sample(String),
}

impl Input {
    fn label(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Sample(name) => name.clone(),
        }
    }

    fn load(&self, catalog: &dyn SampleCatalog) -> Result<IntensityImage> {
        match self {
            Self::File(path) => Ok(load_image(path)?.image),
            Self::Sample(name) => catalog
                .load(name)
                .with_context(|| format!("Failed to load sample {name}")),
        }
    }

    /// File name used as the stem of saved slot files.
    fn file_name(&self) -> &str {
        match self {
            Self::File(path) => path.file_name().and_then(|n| n.to_str()).unwrap_or("image"),
            Self::Sample(name) => name,
        }
    }
}

/// Run the apply command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &ApplyArgs) -> Result<ApplyResult> {
    info!(
        "Running apply on {} paths and {} samples",
        args.paths.len(),
        args.samples.len()
    );

    if !args.has_inputs() {
        anyhow::bail!("No inputs specified");
    }

    let ops = SessionOp::parse_list(args.ops.as_deref().unwrap_or(""), &args.transform_defaults())
        .context("Invalid --ops")?;
    debug!("Operations: {ops:?}");

    let dir = args.samples_dir.clone().unwrap_or_else(samples_dir);
    debug!("Using samples directory: {}", dir.display());
    let catalog = LayeredSamples::standard(dir);

    let mut inputs: Vec<Input> = FsImageSource::new(args.paths.clone(), args.recursive)
        .files()
        .into_iter()
        .map(Input::File)
        .collect();
    inputs.extend(args.samples.iter().cloned().map(Input::Sample));

    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress = ProgressBar::new(Some(inputs.len() as u64), args.quiet, show_progress);
    let output = match args.format() {
        OutputFormat::Jsonl => JsonOutput::stdout(),
        OutputFormat::Json => JsonOutput::stdout().array(args.pretty),
    };

    process_inputs(&inputs, &ops, &catalog, &output, &progress, args)
}

/// Process every input in its own session.
fn process_inputs(
    inputs: &[Input],
    ops: &[SessionOp],
    catalog: &dyn SampleCatalog,
    output: &dyn ReportOutput,
    progress: &dyn ProgressSink,
    args: &ApplyArgs,
) -> Result<ApplyResult> {
    let total = Some(inputs.len());
    let mut processed = 0usize;
    let mut skipped = 0usize;
    let mut used_prefixes: HashSet<PathBuf> = HashSet::new();

    for (index, input) in inputs.iter().enumerate() {
        let path = input.label();
        progress.on_event(ProgressEvent::Started {
            path: path.clone(),
            index,
            total,
        });

        let session = match input.load(catalog).and_then(|image| run_session(image, ops)) {
            Ok(session) => session,
            Err(e) => {
                progress.on_event(ProgressEvent::Skipped {
                    path,
                    reason: format!("{e:#}"),
                });
                skipped += 1;
                continue;
            }
        };

        if let Some(ref out_dir) = args.out_dir {
            let prefix = unique_prefix(out_dir, input.file_name(), &mut used_prefixes);
            let written = save_slots(&session, &prefix)?;
            debug!("Saved {} slot files for {path}", written.len());
        }

        let report = ImageReport {
            path,
            timestamp: iso_timestamp(),
            dimensions: session.input().dimensions(),
            operations: ops.iter().map(ToString::to_string).collect(),
            input: HistogramSummary::of(session.input(), args.histograms),
            output: HistogramSummary::of(session.output(), args.histograms),
        };

        progress.on_event(ProgressEvent::Completed {
            report: Box::new(report.clone()),
        });

        output.write(&report)?;
        processed += 1;
    }

    output.flush()?;

    progress.on_event(ProgressEvent::Finished { processed, skipped });

    let exit_code = if skipped > 0 {
        ExitCode::Skipped
    } else {
        ExitCode::Success
    };

    Ok(ApplyResult {
        processed,
        skipped,
        exit_code,
    })
}

/// Open `image` in a fresh session and run `ops` in order.
fn run_session(image: IntensityImage, ops: &[SessionOp]) -> Result<Session> {
    let mut session = Session::new();
    session.open(image)?;
    for op in ops {
        session
            .run(op)
            .with_context(|| format!("Operation '{op}' failed"))?;
    }
    Ok(session)
}

/// Slot file prefix for `file_name`, unique within one run.
///
/// `rectangle.png` maps to `rectangle`; a second `rectangle.bmp` in the same
/// run maps to `rectangle_bmp`.
fn unique_prefix(out_dir: &Path, file_name: &str, used: &mut HashSet<PathBuf>) -> PathBuf {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    let mut prefix = out_dir.join(stem);
    if used.contains(&prefix) {
        prefix = out_dir.join(file_name.replace('.', "_"));
    }
    let mut n = 2usize;
    let base = prefix.clone();
    while used.contains(&prefix) {
        let mut name = base.as_os_str().to_owned();
        name.push(format!("_{n}"));
        prefix = PathBuf::from(name);
        n += 1;
    }
    used.insert(prefix.clone());
    prefix
}

/// Generate ISO 8601 UTC timestamp (RFC 3339 format).
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}

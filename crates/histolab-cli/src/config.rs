//! Configuration file support for histolab.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/histolab/config.toml` (lowest priority)
//! - Project-local: `.histolab.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use histolab_core::domain::MAX_SHIFT_BITS;
use serde::Deserialize;
use tracing::{debug, info};

/// Project-local config file name.
pub const PROJECT_CONFIG: &str = ".histolab.toml";

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Default transform parameters.
    pub transform: TransformConfig,
    /// Sample catalog settings.
    pub samples: SamplesConfig,
    /// Output settings.
    pub output: OutputConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
}

/// Parameters used when an operation names a transform without a value.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Bit-shift amount (0-31).
    pub shift_bits: Option<u32>,
    /// Scale-up / scale-down factor.
    pub scale_factor: Option<f64>,
    /// Power-law exponent.
    pub gamma: Option<f64>,
    /// Base-log base.
    pub log_base: Option<f64>,
}

/// Sample catalog configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct SamplesConfig {
    /// Custom samples directory path.
    pub dir: Option<PathBuf>,
}

/// Output configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
    /// Embed full histogram vectors in reports.
    pub histograms: Option<bool>,
    /// Directory to save slot PNGs into.
    pub dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/histolab/config.toml`
    /// 2. Project-local: `.histolab.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are logged as warnings.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
        }

        config
    }

    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(bits) = self.transform.shift_bits {
            if bits > MAX_SHIFT_BITS {
                return Err(format!(
                    "transform.shift_bits must be 0-{MAX_SHIFT_BITS}, got {bits}"
                ));
            }
        }

        for (key, value) in [
            ("transform.scale_factor", self.transform.scale_factor),
            ("transform.gamma", self.transform.gamma),
            ("transform.log_base", self.transform.log_base),
        ] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(format!("{key} must be a finite number, got {v}"));
                }
            }
        }

        if let Some(ref f) = self.output.format {
            if f != "json" && f != "jsonl" {
                return Err(format!(
                    "output.format must be 'json' or 'jsonl', got '{f}'"
                ));
            }
        }

        Ok(())
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    pub fn merge(&mut self, other: Self) {
        self.general.recursive = other.general.recursive.or(self.general.recursive);

        self.transform.shift_bits = other.transform.shift_bits.or(self.transform.shift_bits);
        self.transform.scale_factor = other
            .transform
            .scale_factor
            .or(self.transform.scale_factor);
        self.transform.gamma = other.transform.gamma.or(self.transform.gamma);
        self.transform.log_base = other.transform.log_base.or(self.transform.log_base);

        self.samples.dir = other.samples.dir.or_else(|| self.samples.dir.take());

        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);
        self.output.histograms = other.output.histograms.or(self.output.histograms);
        self.output.dir = other.output.dir.or_else(|| self.output.dir.take());
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("histolab").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.histolab.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(PROJECT_CONFIG);
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}

//! Shared helpers for CLI integration tests.

#![allow(dead_code, clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use histolab_test_support::{write_png, SyntheticImageBuilder};

/// A `histolab` invocation isolated from the user's config and data dirs.
pub fn histolab(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("histolab").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("HOME", home)
        .current_dir(home);
    cmd
}

/// Writes a full-range ramp and a low-contrast band into `dir`.
pub fn write_fixtures(dir: &Path) -> (PathBuf, PathBuf) {
    let ramp = write_png(dir, "ramp.png", &SyntheticImageBuilder::horizontal_ramp(256, 4)).unwrap();
    let narrow = write_png(
        dir,
        "narrow.png",
        &SyntheticImageBuilder::narrow_range(64, 8, 100, 140),
    )
    .unwrap();
    (ramp, narrow)
}

/// Parses every non-empty stdout line as JSON.
pub fn json_lines(stdout: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

//! Report output tests.
//!
//! Tests JSON/JSONL correctness, report fields and saved slot files.

#![allow(clippy::unwrap_used)]

mod common;

use common::{histolab, json_lines, write_fixtures};
use serde_json::Value;

#[test]
fn test_jsonl_one_report_per_image() {
    let home = tempfile::tempdir().unwrap();
    let (ramp, narrow) = write_fixtures(home.path());

    let output = histolab(home.path())
        .args(["--format", "jsonl", "--ops", "undo,equalize"])
        .arg(&ramp)
        .arg(&narrow)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));

    let reports = json_lines(&output.stdout);
    assert_eq!(reports.len(), 2);
    for report in &reports {
        assert!(report.is_object());
        for field in ["path", "timestamp", "dimensions", "operations", "input", "output"] {
            assert!(report.get(field).is_some(), "missing {field}");
        }
        assert_eq!(report["operations"], serde_json::json!(["undo", "equalize"]));
    }
    assert!(reports[0]["path"].as_str().unwrap().ends_with("ramp.png"));
    assert_eq!(reports[1]["dimensions"]["width"], 64);
    assert_eq!(reports[1]["dimensions"]["height"], 8);
    // Equalization stretches the narrow band to full white
    assert_eq!(reports[1]["input"]["max"], 140);
    assert_eq!(reports[1]["output"]["max"], 255);
}

#[test]
fn test_json_array_pretty() {
    let home = tempfile::tempdir().unwrap();
    let (ramp, narrow) = write_fixtures(home.path());

    let output = histolab(home.path())
        .args(["--format", "json", "--pretty"])
        .arg(&ramp)
        .arg(&narrow)
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("\n  "), "pretty output is indented");
    let parsed: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 2);
}

#[test]
fn test_negative_mirrors_mean() {
    let home = tempfile::tempdir().unwrap();
    let (ramp, _) = write_fixtures(home.path());

    let output = histolab(home.path())
        .args(["--ops", "negative"])
        .arg(&ramp)
        .output()
        .unwrap();
    let report = &json_lines(&output.stdout)[0];

    let input = report["input"]["mean"].as_f64().unwrap();
    let output_mean = report["output"]["mean"].as_f64().unwrap();
    assert!((input + output_mean - 255.0).abs() < 1e-9);
}

#[test]
fn test_histograms_flag_embeds_vectors() {
    let home = tempfile::tempdir().unwrap();
    let (ramp, _) = write_fixtures(home.path());

    let without = histolab(home.path()).arg(&ramp).output().unwrap();
    assert!(json_lines(&without.stdout)[0]["input"].get("histograms").is_none());

    let with = histolab(home.path())
        .arg("--histograms")
        .arg(&ramp)
        .output()
        .unwrap();
    let report = &json_lines(&with.stdout)[0];
    let hist = &report["input"]["histograms"];
    for field in ["bins", "distribution", "pdf", "cdf", "transform", "equalized"] {
        assert_eq!(hist[field].as_array().unwrap().len(), 256, "{field}");
    }
    assert_eq!(hist["distribution"][17], 4);
}

#[test]
fn test_out_dir_saves_slots() {
    let home = tempfile::tempdir().unwrap();
    let (ramp, _) = write_fixtures(home.path());
    let out = home.path().join("slots");

    histolab(home.path())
        .args(["--ops", "negative"])
        .arg("--out-dir")
        .arg(&out)
        .arg(&ramp)
        .assert()
        .code(0);

    for slot in ["input", "buffer", "output"] {
        let path = out.join(format!("ramp_{slot}.png"));
        assert!(path.is_file(), "{} missing", path.display());
    }
    let saved = image::open(out.join("ramp_output.png")).unwrap().into_luma8();
    assert_eq!(saved.get_pixel(0, 0).0[0], 255);
    assert_eq!(saved.get_pixel(255, 0).0[0], 0);
}

#[test]
fn test_bundled_sample_input() {
    let home = tempfile::tempdir().unwrap();

    let output = histolab(home.path())
        .args(["--sample", "rectangle51.png", "--ops", "undo,equalize"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));

    let report = &json_lines(&output.stdout)[0];
    assert_eq!(report["path"], "rectangle51.png");
    assert_eq!(report["input"]["max"], 51);

    // The rectangle covers an eighth of the frame. Normalization subtracts the
    // black background's cumulative share, so the rectangle lands at 255 / 8.
    let rectangle_share: f64 = 1.0 / 8.0;
    let background = 255.0 * (1.0 - rectangle_share);
    let expected = (255.0 - background).round();
    assert_eq!(report["output"]["max"].as_f64(), Some(expected));
    assert_eq!(report["output"]["min"], 0);
}

#[test]
fn test_bundled_photograph_input() {
    let home = tempfile::tempdir().unwrap();

    let output = histolab(home.path())
        .args(["--sample", "Lenna.png", "--sample", "astronaut.jpg"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));

    let reports = json_lines(&output.stdout);
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["path"], "Lenna.png");
    assert_eq!(reports[1]["dimensions"]["width"], 256);
}

#[test]
fn test_unknown_sample_is_skipped() {
    let home = tempfile::tempdir().unwrap();
    histolab(home.path())
        .args(["--sample", "mandrill.png"])
        .assert()
        .code(1);
}

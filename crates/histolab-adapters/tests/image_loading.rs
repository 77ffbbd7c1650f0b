//! Integration tests for filesystem image discovery and loading.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;

use histolab_adapters::FsImageSource;
use histolab_test_support::{write_png, SyntheticImageBuilder};
use image::{ImageFormat, Rgb, RgbImage};

#[test]
fn test_load_png() {
    let dir = tempfile::tempdir().unwrap();
    let ramp = SyntheticImageBuilder::horizontal_ramp(64, 8);
    let path = write_png(dir.path(), "ramp.png", &ramp).unwrap();

    let source = FsImageSource::new(vec![path.clone()], false);
    let images: Vec<_> = source.images().collect();
    assert_eq!(images.len(), 1);

    let (found, loaded) = images.into_iter().next().unwrap();
    assert_eq!(found, path);
    let loaded = loaded.expect("should load PNG");
    assert_eq!(loaded.image, ramp);
}

#[test]
fn test_color_input_is_converted_to_luma() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("white.bmp");
    RgbImage::from_pixel(4, 3, Rgb([255, 255, 255]))
        .save_with_format(&path, ImageFormat::Bmp)
        .unwrap();

    let (_, loaded) = FsImageSource::new(vec![path], false)
        .images()
        .next()
        .unwrap();
    let image = loaded.expect("should load BMP").image;
    assert_eq!(image.rows(), 3);
    assert_eq!(image.cols(), 4);
    assert!(image.as_raw().iter().all(|&v| v == 255));
}

#[test]
fn test_directory_scan_is_sorted_and_filtered() {
    let dir = tempfile::tempdir().unwrap();
    let img = SyntheticImageBuilder::single_pixel(1);
    write_png(dir.path(), "b.png", &img).unwrap();
    write_png(dir.path(), "a.png", &img).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();

    let files = FsImageSource::new(vec![dir.path().to_path_buf()], false).files();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["a.png", "b.png"]);
}

#[test]
fn test_recursive_scan() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("nested");
    std::fs::create_dir(&nested).unwrap();
    let img = SyntheticImageBuilder::single_pixel(1);
    write_png(dir.path(), "top.png", &img).unwrap();
    write_png(&nested, "deep.png", &img).unwrap();

    let flat = FsImageSource::new(vec![dir.path().to_path_buf()], false).files();
    let deep = FsImageSource::new(vec![dir.path().to_path_buf()], true).files();
    assert_eq!(flat.len(), 1);
    assert_eq!(deep.len(), 2);
}

#[test]
fn test_missing_and_corrupt_files_fail_with_path() {
    let dir = tempfile::tempdir().unwrap();
    let corrupt = dir.path().join("corrupt.png");
    std::fs::write(&corrupt, b"\x89PNG but not really").unwrap();
    let missing = PathBuf::from("/nonexistent/histolab/gone.png");

    let source = FsImageSource::new(vec![corrupt.clone(), missing.clone()], false);
    let results: Vec<_> = source.images().collect();
    assert_eq!(results.len(), 2);

    for (path, result) in results {
        let err = result.expect_err("should fail");
        assert!(format!("{err:#}").contains(&path.display().to_string()));
    }
}

//! Filesystem adapter for loading and saving images.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use histolab_core::{IntensityImage, Session, Slot};
use tracing::{debug, warn};

/// Supported image extensions.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// A decoded image together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// Source path.
    pub path: PathBuf,
    /// Decoded grayscale image.
    pub image: IntensityImage,
}

/// Filesystem image source adapter.
pub struct FsImageSource {
    paths: Vec<PathBuf>,
    recursive: bool,
}

impl FsImageSource {
    /// Creates a new filesystem image source.
    ///
    /// # Arguments
    ///
    /// * `paths` - Files or directories to scan
    /// * `recursive` - Whether to recurse into subdirectories
    #[must_use]
    pub const fn new(paths: Vec<PathBuf>, recursive: bool) -> Self {
        Self { paths, recursive }
    }

    /// Collects all image files from the configured paths, in argument
    /// order with directory contents sorted by name.
    ///
    /// Explicit file arguments are kept even when they do not exist or carry
    /// an unknown extension, so that loading them reports the failure.
    #[must_use]
    pub fn files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for path in &self.paths {
            if path.is_dir() {
                self.collect_from_dir(path, &mut files);
            } else {
                if !path.exists() {
                    warn!("Path does not exist: {}", path.display());
                } else if !is_supported_image(path) {
                    warn!("Unsupported file type: {}", path.display());
                }
                files.push(path.clone());
            }
        }

        debug!("Found {} image files", files.len());
        files
    }

    fn collect_from_dir(&self, dir: &Path, files: &mut Vec<PathBuf>) {
        let entries = match std::fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!("Failed to read directory {}: {e}", dir.display());
                return;
            }
        };

        let mut paths: Vec<PathBuf> = entries.flatten().map(|entry| entry.path()).collect();
        paths.sort();

        for path in paths {
            if path.is_file() && is_supported_image(&path) {
                files.push(path);
            } else if path.is_dir() && self.recursive {
                self.collect_from_dir(&path, files);
            }
        }
    }

    /// Loads every collected file, yielding the path alongside each outcome.
    pub fn images(&self) -> impl Iterator<Item = (PathBuf, Result<LoadedImage>)> {
        self.files().into_iter().map(|path| {
            let loaded = load_image(&path);
            (path, loaded)
        })
    }
}

/// Checks if a path has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
}

/// Loads an image from the filesystem.
///
/// # Errors
///
/// Returns an error naming the path if it cannot be decoded.
pub fn load_image(path: &Path) -> Result<LoadedImage> {
    let image = IntensityImage::from_path(path)
        .with_context(|| format!("Failed to open image: {}", path.display()))?;
    Ok(LoadedImage {
        path: path.to_path_buf(),
        image,
    })
}

/// Writes `image` as a grayscale PNG, creating parent directories.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
pub fn save_png(image: &IntensityImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let bytes = image.encode_png()?;
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    debug!("Saved {}", path.display());
    Ok(())
}

/// File a slot is saved to: `<prefix>_<slot>.png`.
#[must_use]
pub fn slot_path(prefix: &Path, slot: Slot) -> PathBuf {
    let mut name = prefix.as_os_str().to_owned();
    name.push(format!("_{slot}.png"));
    PathBuf::from(name)
}

/// Saves every non-empty slot of `session` next to `prefix`.
///
/// Returns the written paths in slot order.
///
/// # Errors
///
/// Returns the first write failure; slots saved before it stay on disk.
pub fn save_slots(session: &Session, prefix: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (slot, image) in session.slots() {
        if image.is_empty() {
            debug!("Skipping empty {slot} slot");
            continue;
        }
        let path = slot_path(prefix, slot);
        save_png(image, &path)?;
        written.push(path);
    }
    Ok(written)
}

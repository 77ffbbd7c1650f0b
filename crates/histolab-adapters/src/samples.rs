//! Sample image catalogs.
//!
//! The bundled catalog renders every sample on demand and encodes it in the
//! format its name declares. Charts, rectangles and test patterns are exact;
//! the photographs are stood in for by seeded scenes. Real files placed in the
//! samples directory take precedence over both.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use histolab_core::SampleCatalog;
use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use tracing::{debug, warn};

use crate::fs::is_supported_image;

/// Returns the samples directory path.
///
/// Uses `XDG_DATA_HOME/histolab/samples` or `~/.local/share/histolab/samples`.
#[must_use]
pub fn samples_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("histolab")
        .join("samples")
}

/// Side length of the rendered square samples.
const SIDE: u32 = 256;

/// Names served by [`BundledSamples`], in display order.
const BUNDLED: &[&str] = &[
    "apple.jpg",
    "astronaut.jpg",
    "chart_blue.bmp",
    "chart_color.bmp",
    "chart_gray.bmp",
    "chart_green.bmp",
    "chart_red.bmp",
    "elephants.jpg",
    "field.jpg",
    "fountain.jpg",
    "lady.jpg",
    "Lenna.png",
    "Lenna_old.jpeg",
    "octopus.jpg",
    "pollen.jpg",
    "rectangle.bmp",
    "rectangle.png",
    "rectangle.tif",
    "rectangle51.png",
    "rose.jpg",
    "snails.jpg",
    "strawberries.bmp",
    "strawberries.jpg",
    "strawberries.png",
    "test_pattern.png",
    "test_pattern.tif",
    "woman.bmp",
    "woman.png",
    "woman.tif",
];

/// Photographs rendered as seeded scenes, keyed by file stem.
const SCENES: &[&str] = &[
    "apple",
    "astronaut",
    "elephants",
    "field",
    "fountain",
    "lady",
    "Lenna",
    "Lenna_old",
    "octopus",
    "pollen",
    "rose",
    "snails",
    "strawberries",
    "woman",
];

/// Procedurally rendered samples compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledSamples;

impl BundledSamples {
    /// Creates the bundled catalog.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Renders the named sample before encoding.
    fn render(name: &str) -> Option<DynamicImage> {
        let stem = name.split_once('.').map_or(name, |(stem, _)| stem);
        let image = match stem {
            "chart_gray" => DynamicImage::ImageLuma8(gray_chart()),
            "chart_red" => DynamicImage::ImageRgb8(channel_chart(0)),
            "chart_green" => DynamicImage::ImageRgb8(channel_chart(1)),
            "chart_blue" => DynamicImage::ImageRgb8(channel_chart(2)),
            "chart_color" => DynamicImage::ImageRgb8(color_chart()),
            "rectangle" => DynamicImage::ImageLuma8(rectangle(255)),
            "rectangle51" => DynamicImage::ImageLuma8(rectangle(51)),
            "test_pattern" => DynamicImage::ImageLuma8(test_pattern()),
            _ if SCENES.contains(&stem) => DynamicImage::ImageRgb8(scene(seed_of(stem))),
            _ => return None,
        };
        Some(image)
    }
}

impl SampleCatalog for BundledSamples {
    fn names(&self) -> Vec<String> {
        BUNDLED.iter().map(ToString::to_string).collect()
    }

    fn bytes(&self, name: &str) -> Result<Vec<u8>> {
        if !BUNDLED.contains(&name) {
            bail!("no bundled sample named '{name}'");
        }
        let image = Self::render(name).with_context(|| format!("no renderer for '{name}'"))?;
        let format = ImageFormat::from_path(name)
            .with_context(|| format!("unknown format for sample '{name}'"))?;

        let mut bytes = Cursor::new(Vec::new());
        image
            .write_to(&mut bytes, format)
            .with_context(|| format!("Failed to encode sample '{name}'"))?;
        debug!("Rendered bundled sample {name}");
        Ok(bytes.into_inner())
    }
}

/// Image files found in a samples directory.
#[derive(Debug, Clone)]
pub struct DirSamples {
    dir: PathBuf,
}

impl DirSamples {
    /// Creates a catalog over `dir`. The directory need not exist.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory being served.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SampleCatalog for DirSamples {
    fn names(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            debug!("Samples directory {} not readable", self.dir.display());
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_supported_image(path))
            .filter_map(|path| path.file_name()?.to_str().map(ToString::to_string))
            .collect();
        names.sort();
        names
    }

    fn bytes(&self, name: &str) -> Result<Vec<u8>> {
        // Only bare file names, never paths out of the directory
        if Path::new(name).file_name().and_then(|n| n.to_str()) != Some(name) {
            bail!("invalid sample name '{name}'");
        }
        let path = self.dir.join(name);
        std::fs::read(&path).with_context(|| format!("Failed to read sample {}", path.display()))
    }
}

/// Several catalogs consulted in order; the first that lists a name serves it.
pub struct LayeredSamples {
    layers: Vec<Box<dyn SampleCatalog>>,
}

impl LayeredSamples {
    /// Creates a catalog over `layers`, highest priority first.
    #[must_use]
    pub fn new(layers: Vec<Box<dyn SampleCatalog>>) -> Self {
        Self { layers }
    }

    /// The samples directory in front of the bundled set.
    #[must_use]
    pub fn standard(dir: impl Into<PathBuf>) -> Self {
        Self::new(vec![
            Box::new(DirSamples::new(dir)),
            Box::new(BundledSamples::new()),
        ])
    }
}

impl SampleCatalog for LayeredSamples {
    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for layer in &self.layers {
            for name in layer.names() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    fn bytes(&self, name: &str) -> Result<Vec<u8>> {
        for layer in &self.layers {
            if layer.contains(name) {
                return layer.bytes(name);
            }
        }
        bail!("no sample named '{name}'")
    }
}

/// Writes the encoded bytes of sample `name` to `dest`.
///
/// # Errors
///
/// Returns an error if the sample is unknown or the file cannot be written.
pub fn export_sample(catalog: &dyn SampleCatalog, name: &str, dest: &Path) -> Result<()> {
    if !catalog.contains(name) {
        bail!("unknown sample image '{name}'");
    }
    let bytes = catalog.bytes(name)?;
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(dest, bytes).with_context(|| format!("Failed to write {}", dest.display()))?;
    if !is_supported_image(dest) {
        warn!(
            "{} has no image extension; the bytes are encoded as {name}",
            dest.display()
        );
    }
    Ok(())
}

// === Renderers ===

/// Eight vertical bars stepping from black to white.
#[allow(clippy::cast_possible_truncation)]
fn gray_chart() -> GrayImage {
    GrayImage::from_fn(SIDE, SIDE / 2, |x, _| {
        // Safe: 8 bars, at most 7 * 255 / 7
        let bar = x * 8 / SIDE;
        Luma([(bar * 255 / 7) as u8])
    })
}

/// Eight bars stepping through one color channel.
#[allow(clippy::cast_possible_truncation)]
fn channel_chart(channel: usize) -> RgbImage {
    RgbImage::from_fn(SIDE, SIDE / 2, |x, _| {
        let bar = x * 8 / SIDE;
        let mut rgb = [0u8; 3];
        // Safe: at most 255
        rgb[channel] = (bar * 255 / 7) as u8;
        Rgb(rgb)
    })
}

/// The eight RGB primaries and secondaries, including black and white.
fn color_chart() -> RgbImage {
    const COLORS: [[u8; 3]; 8] = [
        [0, 0, 0],
        [0, 0, 255],
        [255, 0, 0],
        [255, 0, 255],
        [0, 255, 0],
        [0, 255, 255],
        [255, 255, 0],
        [255, 255, 255],
    ];
    RgbImage::from_fn(SIDE, SIDE / 2, |x, _| Rgb(COLORS[(x * 8 / SIDE) as usize]))
}

/// A centered rectangle of `value` on black.
fn rectangle(value: u8) -> GrayImage {
    let (x0, x1) = (SIDE / 4, SIDE * 3 / 4);
    let (y0, y1) = (SIDE * 3 / 8, SIDE * 5 / 8);
    GrayImage::from_fn(SIDE, SIDE, |x, y| {
        if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
            Luma([value])
        } else {
            Luma([0])
        }
    })
}

/// Four quadrants: horizontal ramp, checkerboard, vertical ramp, rings.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn test_pattern() -> GrayImage {
    let half = SIDE / 2;
    GrayImage::from_fn(SIDE, SIDE, |x, y| {
        let (qx, qy) = (x % half, y % half);
        // Safe: every branch stays within 0..=255
        let value = match (x < half, y < half) {
            (true, true) => qx * 255 / (half - 1),
            (false, true) => {
                if (qx / 16 + qy / 16) % 2 == 0 {
                    255
                } else {
                    0
                }
            }
            (true, false) => qy * 255 / (half - 1),
            (false, false) => {
                let dx = f64::from(qx) - f64::from(half) / 2.0;
                let dy = f64::from(qy) - f64::from(half) / 2.0;
                let r = (dx * dx + dy * dy).sqrt();
                ((r / 4.0).sin() * 127.5 + 127.5) as u32
            }
        };
        Luma([value.min(255) as u8])
    })
}

/// FNV-1a hash of a scene stem; every format of one photograph shares it.
fn seed_of(stem: &str) -> u64 {
    stem.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

/// Linear congruential generator driving scene layouts.
struct Lcg(u64);

impl Lcg {
    #[allow(clippy::cast_possible_truncation)]
    fn below(&mut self, bound: u32) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        // Safe: top 31 bits
        ((self.0 >> 33) as u32) % bound
    }

    fn color(&mut self) -> [f64; 3] {
        std::array::from_fn(|_| f64::from(self.below(256)))
    }
}

/// A soft disc blended over the scene background.
struct Blob {
    x: f64,
    y: f64,
    radius: f64,
    color: [f64; 3],
}

/// Fine grain in `0..16` for one pixel.
#[allow(clippy::cast_possible_truncation)]
fn grain(seed: u64, x: u32, y: u32) -> u8 {
    let key = ((u64::from(x) << 32) | u64::from(y)) ^ seed;
    // Safe: top 4 bits
    (key.wrapping_mul(0x9e37_79b9_7f4a_7c15) >> 60) as u8
}

/// Photograph stand-in: a tilted two-color gradient under five soft blobs,
/// with per-pixel grain so the histogram is well populated.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scene(seed: u64) -> RgbImage {
    let mut rng = Lcg(seed);
    let from = rng.color();
    let to = rng.color();
    let angle = f64::from(rng.below(360)).to_radians();
    let (dx, dy) = (angle.cos(), angle.sin());
    let blobs: Vec<Blob> = (0..5)
        .map(|_| Blob {
            x: f64::from(rng.below(SIDE)),
            y: f64::from(rng.below(SIDE)),
            radius: f64::from(20 + rng.below(70)),
            color: rng.color(),
        })
        .collect();

    let side = f64::from(SIDE);
    RgbImage::from_fn(SIDE, SIDE, |x, y| {
        let (fx, fy) = (f64::from(x), f64::from(y));
        // Projection onto the gradient direction, scaled into 0..=1
        let along = (fx / side - 0.5) * dx + (fy / side - 0.5) * dy;
        let t = (along / std::f64::consts::SQRT_2 + 0.5).clamp(0.0, 1.0);
        let mut rgb: [f64; 3] = std::array::from_fn(|c| from[c] + (to[c] - from[c]) * t);

        for blob in &blobs {
            let d2 = (fx - blob.x).powi(2) + (fy - blob.y).powi(2);
            let weight = (-d2 / (2.0 * blob.radius * blob.radius)).exp();
            for (value, target) in rgb.iter_mut().zip(blob.color) {
                *value += (target - *value) * weight;
            }
        }

        let noise = f64::from(grain(seed, x, y)) - 8.0;
        // Safe: clamped to 0..=255
        Rgb(rgb.map(|v| (v + noise).round().clamp(0.0, 255.0) as u8))
    })
}

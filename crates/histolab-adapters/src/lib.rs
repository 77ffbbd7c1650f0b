//! Histolab Adapters - External adapters for histolab.
//!
//! This crate provides adapters for:
//! - Filesystem image discovery, loading and PNG saving
//! - Bundled and on-disk sample image catalogs

pub mod fs;
pub mod samples;

pub use fs::{save_png, save_slots, slot_path, FsImageSource, LoadedImage};
pub use samples::{export_sample, samples_dir, BundledSamples, DirSamples, LayeredSamples};

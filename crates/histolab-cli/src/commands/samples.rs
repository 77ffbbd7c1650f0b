//! Samples command - list, locate and export sample images.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Subcommand};
use histolab_adapters::{export_sample, samples_dir, DirSamples, LayeredSamples};
use histolab_core::SampleCatalog;
use tracing::info;

use crate::config::AppConfig;

/// Arguments for the samples command
#[derive(Args)]
pub struct SamplesArgs {
    /// Custom samples directory (overrides default and config)
    #[arg(long, value_name = "DIR", global = true)]
    pub samples_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: SamplesCommand,
}

/// Samples subcommands
#[derive(Subcommand)]
pub enum SamplesCommand {
    /// List available samples
    List,
    /// Print samples directory path
    Path,
    /// Write a sample's encoded bytes to a file
    Export {
        /// Sample name, e.g. `test_pattern.png`
        name: String,
        /// Destination file
        file: PathBuf,
    },
}

/// Run the samples command.
pub fn run(args: &SamplesArgs, config: &AppConfig) -> Result<()> {
    let dir = args
        .samples_dir
        .clone()
        .or_else(|| config.samples.dir.clone())
        .unwrap_or_else(samples_dir);

    match &args.command {
        SamplesCommand::List => list_samples(&dir),
        SamplesCommand::Path => print_path(&dir),
        SamplesCommand::Export { name, file } => {
            export_sample(&LayeredSamples::standard(dir), name, file)?;
            info!("Exported {name} to {}", file.display());
            Ok(())
        }
    }
}

#[allow(clippy::unnecessary_wraps)]
fn list_samples(dir: &Path) -> Result<()> {
    let on_disk = DirSamples::new(dir);
    let catalog = LayeredSamples::standard(dir);

    println!("Samples directory: {}", dir.display());
    println!();

    let names = catalog.names();
    for name in &names {
        let origin = if on_disk.contains(name) { "dir" } else { "bundled" };
        println!("  {name} ({origin})");
    }

    println!();
    println!("{} samples available", names.len());

    Ok(())
}

#[allow(clippy::unnecessary_wraps)]
fn print_path(dir: &Path) -> Result<()> {
    println!("{}", dir.display());
    Ok(())
}

//! CLI command definitions and handlers.

pub mod apply;
pub mod samples;

use clap::{Parser, Subcommand};

/// Histolab - Grayscale intensity transforms and histogram reports
#[derive(Parser)]
#[command(name = "histolab")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Shared apply arguments (inputs, operations, output flags).
    #[command(flatten)]
    pub apply: apply::ApplyArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Run operations on images and report their histograms
    Apply(apply::ApplyArgs),
    /// List, locate and export sample images
    Samples(samples::SamplesArgs),
}

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Every input was processed.
    Success,
    /// At least one input was skipped.
    Skipped,
    /// Fatal error: bad arguments or unwritable output.
    Error,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        match code {
            ExitCode::Success => Self::from(0),
            ExitCode::Skipped => Self::from(1),
            ExitCode::Error => Self::from(2),
        }
    }
}

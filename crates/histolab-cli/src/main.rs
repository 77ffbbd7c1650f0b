//! Histolab CLI - Grayscale intensity transforms and histogram reports.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{apply::ApplyArgs, Cli, Commands, ExitCode};
use config::AppConfig;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = AppConfig::load();

    let exit_code = match cli.command {
        Some(Commands::Apply(args)) => run_apply(args, &config),
        Some(Commands::Samples(ref args)) => match commands::samples::run(args, &config) {
            Ok(()) => ExitCode::Success,
            Err(e) => {
                eprintln!("error: {e:#}");
                ExitCode::Error
            }
        },
        None => {
            // Default behavior: apply with flattened args
            if !cli.apply.has_inputs() {
                eprintln!("error: No inputs specified. Use --help for usage information.");
                return ExitCode::Error.into();
            }
            run_apply(cli.apply, &config)
        }
    };

    exit_code.into()
}

fn run_apply(args: ApplyArgs, config: &AppConfig) -> ExitCode {
    let args = ApplyArgs::with_config(args, config);
    match commands::apply::run(&args) {
        Ok(result) => result.exit_code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::Error
        }
    }
}

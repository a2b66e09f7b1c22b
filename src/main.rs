// src/main.rs

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use reposync::ErrorClass;
use std::process::ExitCode;
use tracing::error;

/// Process exit status for a failed run
///
/// Parse-level and unclassified failures share status 1, which is also
/// what a bad command line produces.
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<reposync::Error>().map(reposync::Error::class) {
        Some(ErrorClass::NoPackages) => 2,
        Some(ErrorClass::Configuration) => 3,
        Some(ErrorClass::UpdateFailed) => 4,
        Some(ErrorClass::AddFailed) => 5,
        Some(ErrorClass::Regeneration) => 6,
        Some(ErrorClass::Unspecified) | None => 1,
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                // --help / --version
                ExitCode::SUCCESS
            };
        }
    };

    // Initialize tracing subscriber for logging
    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match commands::cmd_sync(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

//! Explorer CLI - Command-line interface
//!
//! Generates and inspects period overviews for the datasets of a catalog.

mod cli;
mod commands;
mod config_loader;
mod datasets;
mod errors;
mod output;
mod output_types;
mod progress;
mod storage;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

fn main() -> Result<()> {
    // Logs go to stderr so that --json output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let runtime = tokio::runtime::Runtime::new()?;

    if let Err(err) = runtime.block_on(commands::execute(cli)) {
        match err.downcast_ref::<errors::CliError>() {
            Some(cli_error) => cli_error.display(),
            None => errors::from_anyhow(&err).display(),
        }
        std::process::exit(1);
    }

    Ok(())
}

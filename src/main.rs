//! History Viewer - explore a streaming-history export.
//!
//! Uploads an export archive to the history backend, rolls the returned
//! per-song rows up into album and artist tables, and lets you filter, sort
//! and page through them from the command line.

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod remote;
#[cfg(test)]
pub mod test_utils;
pub mod view;

use clap::{CommandFactory, Parser};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("history_viewer=info".parse()?))
        .init();

    // Try to run a CLI command
    if cli::run_command(&args)? {
        return Ok(());
    }

    // No command specified, show usage
    cli::Cli::command().print_help()?;
    println!();
    Ok(())
}

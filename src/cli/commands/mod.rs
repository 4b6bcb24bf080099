//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `table`: upload an export (or load a saved response) and print a page
//! - `browse`: interactive session over one upload
//! - `lookup`: album/artist detail and monthly top songs
//! - `render`: plain-text tables shared by all of the above

mod browse;
mod lookup;
mod render;
mod table;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::config::{self, Config};
use crate::error::ResultExt;
use crate::model::{Column, Granularity};
use crate::remote::{DetailKind, HistoryClient};

pub use browse::cmd_browse;
pub use lookup::{cmd_detail, cmd_monthly};
pub use table::{cmd_inspect, cmd_upload};

/// History Viewer CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Backend base URL, e.g. http://localhost:5000/api (overrides the config file)
    #[arg(long, global = true, env = "HISTORY_VIEWER_SERVER")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// How the table is shaped before printing
#[derive(Args, Debug, Clone, Default)]
pub struct ViewArgs {
    /// Level to show: song, album or artist
    #[arg(long, default_value = "song")]
    pub by: Granularity,
    /// Column to sort by (defaults to plays)
    #[arg(long)]
    pub sort: Option<Column>,
    /// Sort ascending instead of descending
    #[arg(long)]
    pub asc: bool,
    /// Only keep rows containing this text
    #[arg(long)]
    pub filter: Option<String>,
    /// Number of rows to print (defaults to the configured window)
    #[arg(long)]
    pub rows: Option<usize>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Upload a streaming-history export (.zip) and print the table
    Upload {
        /// Path to the .zip export
        path: PathBuf,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Print the table for a saved upload response, without a server
    Inspect {
        /// Path to a JSON upload response
        path: PathBuf,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Upload an export and explore it interactively
    Browse {
        /// Path to the .zip export
        path: PathBuf,
    },
    /// Show the songs behind one album or artist
    Detail {
        /// album or artist
        kind: DetailKind,
        /// Album or artist name
        name: String,
    },
    /// Show the top songs of each month
    Monthly,
    /// Print the config file location and effective settings
    Config {
        /// Write the effective settings to the config file if none exists yet
        #[arg(long)]
        init: bool,
    },
}

/// Run the specified CLI command.
///
/// Returns `Ok(true)` if a command was run, `Ok(false)` if no command was
/// specified (meaning usage should be printed).
pub fn run_command(cli: &Cli) -> anyhow::Result<bool> {
    let Some(command) = &cli.command else {
        return Ok(false);
    };

    let config = effective_config(config::load(), cli.server.as_deref());
    let rt = Runtime::new()?;

    match command {
        Commands::Upload { path, view } => cmd_upload(&rt, &config, path, view)?,
        Commands::Inspect { path, view } => cmd_inspect(&rt, &config, path, view)?,
        Commands::Browse { path } => cmd_browse(&rt, &config, path)?,
        Commands::Detail { kind, name } => cmd_detail(&rt, &config, *kind, name)?,
        Commands::Monthly => cmd_monthly(&rt, &config)?,
        Commands::Config { init } => cmd_config(&config, *init)?,
    }
    Ok(true)
}

/// Print the config path and the settings in effect
fn cmd_config(config: &Config, init: bool) -> anyhow::Result<()> {
    if init {
        match config::config_path() {
            Some(path) if path.exists() => println!("Config file already exists, left unchanged"),
            _ => config::save(config).with_context("writing config file")?,
        }
    }
    match config::config_path() {
        Some(path) if path.exists() => println!("Config file: {}", path.display()),
        Some(path) => println!("Config file: {} (not created, using defaults)", path.display()),
        None => println!("Config file: unavailable on this platform"),
    }
    println!();
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Apply command-line overrides on top of the loaded config
pub(crate) fn effective_config(mut config: Config, server: Option<&str>) -> Config {
    if let Some(url) = server.map(str::trim).filter(|url| !url.is_empty()) {
        config.server.base_url = url.to_string();
    }
    config
}

/// Build the HTTP client for the configured backend
pub(crate) fn client(config: &Config) -> anyhow::Result<HistoryClient> {
    tracing::debug!("Using backend at {}", config.server.base_url);
    Ok(HistoryClient::new(
        config.server.base_url.clone(),
        config.server.timeout(),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_upload_options() {
        let cli = Cli::try_parse_from([
            "history-viewer",
            "upload",
            "export.zip",
            "--by",
            "artist",
            "--sort",
            "album count",
            "--asc",
            "--rows",
            "20",
        ])
        .unwrap();

        let Some(Commands::Upload { path, view }) = cli.command else {
            panic!("expected upload");
        };
        assert_eq!(path, PathBuf::from("export.zip"));
        assert_eq!(view.by, Granularity::Artist);
        assert_eq!(view.sort, Some(Column::AlbumCount));
        assert!(view.asc);
        assert_eq!(view.rows, Some(20));
    }

    #[test]
    fn test_parse_detail() {
        let cli = Cli::try_parse_from(["history-viewer", "detail", "album", "Blue"]).unwrap();
        let Some(Commands::Detail { kind, name }) = cli.command else {
            panic!("expected detail");
        };
        assert_eq!(kind, DetailKind::Album);
        assert_eq!(name, "Blue");
    }

    #[test]
    fn test_parse_config_init() {
        let cli = Cli::try_parse_from(["history-viewer", "config", "--init"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Config { init: true })));

        let cli = Cli::try_parse_from(["history-viewer", "config"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Config { init: false })));
    }

    #[test]
    fn test_server_flag_overrides_config() {
        let config = effective_config(Config::default(), Some(" http://example.test/api "));
        assert_eq!(config.server.base_url, "http://example.test/api");

        let config = effective_config(Config::default(), Some(""));
        assert_eq!(config.server.base_url, crate::remote::DEFAULT_BASE_URL);
    }
}

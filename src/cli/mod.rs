//! Command-line interface for history-viewer.
//!
//! This module provides commands for uploading a streaming-history export
//! and exploring the resulting song, album and artist tables in a terminal.

mod commands;

pub use commands::{Cli, Commands, run_command};

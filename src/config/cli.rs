//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Route-Watch: routing-table change monitor
///
/// Watches a routing-table dump and reports which route records changed
/// every time the file is rewritten.
#[derive(Debug, Parser)]
#[command(name = "route-watch")]
#[command(version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Routing-table file to watch (required for watch mode)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Quiet period in milliseconds before a burst of file events triggers a reload
    #[arg(long = "debounce-ms", value_name = "MS")]
    pub debounce_ms: Option<u64>,

    /// Line prefix that starts a new record
    #[arg(long, value_name = "TEXT")]
    pub marker: Option<String>,

    /// Maximum number of changed keys listed individually per reload
    #[arg(long = "max-listed", value_name = "N")]
    pub max_listed: Option<usize>,

    /// Path to configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short)]
    pub verbose: bool,
}

/// Subcommands for route-watch
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "route-watch.toml")]
        output: PathBuf,
    },
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Parses CLI arguments from an iterator, returning clap's error
    /// instead of exiting.
    ///
    /// # Errors
    ///
    /// Returns the clap error for unknown flags or malformed values.
    pub fn try_parse_from_iter<I, T>(iter: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }
}

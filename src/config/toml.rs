//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// File watching configuration
    #[serde(default)]
    pub watch: WatchSection,

    /// Record chunking configuration
    #[serde(default)]
    pub table: TableSection,

    /// Change report configuration
    #[serde(default)]
    pub report: ReportSection,
}

/// File watching configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    /// Routing-table file to watch
    pub file: Option<PathBuf>,

    /// Debounce quiet period in milliseconds
    pub debounce_ms: Option<u64>,
}

/// Record chunking configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableSection {
    /// Line prefix that starts a new record
    pub marker: Option<String>,
}

/// Change report configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportSection {
    /// Maximum number of changed keys listed individually
    pub max_listed: Option<usize>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# Route-Watch Configuration File

[watch]
# Routing-table file to watch (required unless given on the command line)
# file = "/var/lib/routes/table.txt"

# Quiet period in milliseconds: a burst of file events closer together than
# this triggers a single reload (default: 500)
# debounce_ms = 500

[table]
# Line prefix that starts a new record (default: "Destination:")
# The second whitespace-separated token on that line is the record key.
# marker = "Destination:"

[report]
# Maximum number of changed keys listed individually per reload (default: 10)
# max_listed = 10
"#
    .to_string()
}

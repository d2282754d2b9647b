//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::table::Chunker;
use crate::watch::DebouncePolicy;

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    /// Routing-table file to watch (required, exists at validation time)
    pub file: PathBuf,

    /// Debounce quiet period
    pub debounce: Duration,

    /// Record-start marker
    pub marker: String,

    /// Maximum number of changed keys listed individually per reload
    pub max_listed: usize,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config {{ file: {}, debounce: {}ms, marker: {:?}, max_listed: {} }}",
            self.file.display(),
            self.debounce.as_millis(),
            self.marker,
            self.max_listed,
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file is not given, or does not exist
    /// - The debounce period is zero
    /// - The marker is empty or contains whitespace
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let file = Self::resolve_file(cli, toml)?;
        let debounce = Self::resolve_debounce(cli, toml)?;
        let marker = Self::resolve_marker(cli, toml)?;

        // Priority: CLI explicit > TOML > default
        let max_listed = cli
            .max_listed
            .or_else(|| toml.and_then(|t| t.report.max_listed))
            .unwrap_or(defaults::MAX_LISTED);

        Ok(Self {
            file,
            debounce,
            marker,
            max_listed,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    /// Returns the debounce policy for the watcher.
    #[must_use]
    pub const fn debounce_policy(&self) -> DebouncePolicy {
        DebouncePolicy::new(self.debounce)
    }

    /// Returns a chunker for the configured marker.
    #[must_use]
    pub fn chunker(&self) -> Chunker {
        Chunker::new(self.marker.clone())
    }

    fn resolve_file(cli: &Cli, toml: Option<&TomlConfig>) -> Result<PathBuf, ConfigError> {
        // CLI takes precedence
        let file = cli
            .file
            .clone()
            .or_else(|| toml.and_then(|t| t.watch.file.clone()))
            .ok_or_else(|| {
                ConfigError::missing(field::FILE, "Pass FILE or set watch.file in config file")
            })?;

        // Only a definite "not found" is rejected; other stat failures
        // surface from the initial load with a more precise error.
        if matches!(file.try_exists(), Ok(false)) {
            return Err(ConfigError::FileNotFound { path: file });
        }

        Ok(file)
    }

    fn resolve_debounce(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Duration, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let millis = cli
            .debounce_ms
            .or_else(|| toml.and_then(|t| t.watch.debounce_ms))
            .unwrap_or(defaults::DEBOUNCE_MS);

        if millis == 0 {
            return Err(ConfigError::InvalidDuration {
                field: "debounce_ms",
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(Duration::from_millis(millis))
    }

    fn resolve_marker(cli: &Cli, toml: Option<&TomlConfig>) -> Result<String, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let marker = cli
            .marker
            .as_deref()
            .or_else(|| toml.and_then(|t| t.table.marker.as_deref()))
            .unwrap_or(defaults::MARKER);

        if marker.is_empty() {
            return Err(ConfigError::InvalidMarker {
                value: marker.to_string(),
                reason: "must not be empty",
            });
        }

        if marker.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidMarker {
                value: marker.to_string(),
                reason: "must not contain whitespace",
            });
        }

        Ok(marker.to_string())
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

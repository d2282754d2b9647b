//! Application execution logic.
//!
//! This module contains the main async execution flow that loads the
//! routing table, watches it for modifications and logs which records
//! changed on every reload.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::signal;

use route_watch::config::ValidatedConfig;
use route_watch::table::{FileSource, RecordStore, ReloadReport, TableError, TableSource};
use route_watch::watch::{DebouncePolicy, FileWatcher, WatchError};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to load the table before watching.
    #[error("Failed to load initial table: {0}")]
    InitialLoad(#[source] TableError),

    /// Failed to set up the file watch.
    #[error("Failed to watch file: {0}")]
    WatchSetup(#[source] WatchError),
}

/// Runtime options extracted from validated config.
struct RuntimeOptions {
    file: PathBuf,
    policy: DebouncePolicy,
    max_listed: usize,
}

impl From<&ValidatedConfig> for RuntimeOptions {
    fn from(config: &ValidatedConfig) -> Self {
        Self {
            file: config.file.clone(),
            policy: config.debounce_policy(),
            max_listed: config.max_listed,
        }
    }
}

/// Executes the main application flow.
///
/// This function:
/// 1. Loads the routing table once and logs the record count
/// 2. Starts a debounced watch on the file
/// 3. Reloads and logs the changed keys after each burst of modifications
/// 4. Runs until shutdown signal (Ctrl+C / SIGTERM), then stops the watch
///
/// # Errors
///
/// Returns an error if:
/// - The initial load fails
/// - The file's directory cannot be watched
///
/// # Coverage Note
///
/// This function is excluded from coverage because it requires a real
/// async runtime with signal handling.
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig) -> Result<(), RunError> {
    let options = RuntimeOptions::from(&config);

    let store = Arc::new(RecordStore::new(
        FileSource::new(&options.file),
        config.chunker(),
    ));

    let loaded = store.load().map_err(RunError::InitialLoad)?;
    tracing::info!(
        "Loaded {} records from {} in {}",
        loaded.records,
        store.source().origin(),
        format_elapsed(loaded.elapsed)
    );

    let on_change = {
        let store = Arc::clone(&store);
        let max_listed = options.max_listed;
        move || reload_and_report(&store, max_listed)
    };

    let mut watcher = FileWatcher::start(&options.file, options.policy, on_change)
        .map_err(RunError::WatchSetup)?;
    tracing::info!(
        "Watching {} for changes (press Ctrl+C to exit)",
        watcher.path().display()
    );
    tracing::debug!(
        "Debounce window: {}ms",
        watcher.policy().window().as_millis()
    );

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, stopping...");
    watcher.shutdown().await;

    Ok(())
}

/// Runs one reload cycle and logs its outcome.
///
/// A failed reload keeps the previous snapshot published, so it is
/// logged and the watch carries on.
fn reload_and_report<S: TableSource>(store: &RecordStore<S>, max_listed: usize) {
    match store.reload() {
        Ok(report) => {
            for line in describe_reload(&report, max_listed) {
                tracing::info!("{line}");
            }
        }
        Err(e) => {
            tracing::error!("Reload failed, keeping previous table: {e}");
        }
    }
}

/// Renders a reload report as log lines.
///
/// The first line is the headline; listed keys and the overflow count
/// follow, one per line.
fn describe_reload(report: &ReloadReport, max_listed: usize) -> Vec<String> {
    let elapsed = format_elapsed(report.elapsed);

    if report.changes.is_empty() {
        return vec![format!("No changes detected (checked in {elapsed})")];
    }

    let mut lines = vec![format!(
        "Found {} changed records ({} total, reloaded in {elapsed})",
        report.changes.len(),
        report.records
    )];
    let summary = report.changes.summary(max_listed).to_string();
    lines.extend(summary.lines().map(str::to_owned));
    lines
}

/// Formats an elapsed duration with millisecond precision.
fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.3}ms", elapsed.as_secs_f64() * 1000.0)
}

/// Returns a future that completes when a shutdown signal is received.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

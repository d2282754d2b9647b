//! Debounced watcher for a single file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::CancellationToken;

use super::WatchError;
use super::debounce::{ChangeCallback, DebouncePolicy, Debouncer};
use super::signal::RawSignal;

/// Item delivered by the notification primitive.
pub type SignalResult = Result<RawSignal, notify::Error>;

/// Watches one file and invokes a callback once per debounced burst of
/// content changes.
///
/// # Design
///
/// The parent directory is watched rather than the file itself, so the
/// watch survives the file being replaced by an atomic rename. Raw events
/// are forwarded from the notification primitive into a channel and
/// consumed by a background task, which filters them down to create/write
/// signals for the exact watched path and feeds them to a [`Debouncer`].
///
/// Errors from the primitive are logged and do not stop the watch.
///
/// # Example
///
/// ```ignore
/// use route_watch::watch::{DebouncePolicy, FileWatcher};
///
/// let mut watcher = FileWatcher::start("routes.txt".as_ref(), DebouncePolicy::default(), || {
///     println!("routes.txt changed");
/// })?;
/// // ...
/// watcher.shutdown().await;
/// ```
pub struct FileWatcher {
    path: PathBuf,
    debouncer: Arc<Debouncer>,
    cancel: CancellationToken,
    consumer: Option<JoinHandle<()>>,
    notifier: Option<RecommendedWatcher>,
}

impl FileWatcher {
    /// Starts watching `path`.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be resolved or its directory
    /// cannot be watched.
    pub fn start<F>(path: &Path, policy: DebouncePolicy, on_change: F) -> Result<Self, WatchError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let path = path
            .canonicalize()
            .map_err(|source| WatchError::Canonicalize {
                path: path.to_path_buf(),
                source,
            })?;
        let dir = path
            .parent()
            .ok_or_else(|| WatchError::NoParent { path: path.clone() })?
            .to_path_buf();

        let (tx, rx) = unbounded_channel();
        let notifier = create_notifier(&dir, tx)?;
        tracing::debug!("Watching directory {} for {}", dir.display(), path.display());

        let mut watcher = Self::from_channel(path, policy, Arc::new(on_change), rx);
        watcher.notifier = Some(notifier);
        Ok(watcher)
    }

    /// Starts the consumer loop over an existing signal channel.
    pub(crate) fn from_channel(
        path: PathBuf,
        policy: DebouncePolicy,
        on_change: ChangeCallback,
        signals: UnboundedReceiver<SignalResult>,
    ) -> Self {
        let debouncer = Arc::new(Debouncer::new(policy, on_change));
        let cancel = CancellationToken::new();
        let consumer = tokio::spawn(consume(
            path.clone(),
            UnboundedReceiverStream::new(signals),
            Arc::clone(&debouncer),
            cancel.clone(),
        ));

        Self {
            path,
            debouncer,
            cancel,
            consumer: Some(consumer),
            notifier: None,
        }
    }

    /// Returns the resolved path being watched.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the debounce policy in effect.
    #[must_use]
    pub fn policy(&self) -> &DebouncePolicy {
        self.debouncer.policy()
    }

    /// Returns true if a debounced callback is scheduled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Returns true until [`shutdown`](Self::shutdown) completes.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.consumer.is_some()
    }

    /// Stops the watch.
    ///
    /// Cancels any scheduled callback, stops consuming signals, releases
    /// the OS watch and waits for the consumer task to exit. A callback
    /// already running completes. Calling this more than once is a no-op.
    pub async fn shutdown(&mut self) {
        self.cancel.cancel();
        self.debouncer.close();
        self.notifier.take();

        if let Some(consumer) = self.consumer.take() {
            if let Err(e) = consumer.await {
                tracing::warn!("Signal consumer ended abnormally: {e}");
            }
            tracing::debug!("Stopped watching {}", self.path.display());
        }
    }
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher")
            .field("path", &self.path)
            .field("debouncer", &self.debouncer)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.debouncer.close();
    }
}

fn create_notifier(
    dir: &Path,
    tx: UnboundedSender<SignalResult>,
) -> Result<RecommendedWatcher, WatchError> {
    let setup_error = |source| WatchError::Setup {
        path: dir.to_path_buf(),
        source,
    };

    // Sends only fail once the consumer is gone, i.e. during shutdown.
    let mut notifier = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        match res {
            Ok(event) => {
                for signal in RawSignal::from_event(&event) {
                    let _ = tx.send(Ok(signal));
                }
            }
            Err(e) => {
                let _ = tx.send(Err(e));
            }
        }
    })
    .map_err(setup_error)?;

    notifier
        .watch(dir, RecursiveMode::NonRecursive)
        .map_err(setup_error)?;

    Ok(notifier)
}

async fn consume(
    path: PathBuf,
    mut signals: UnboundedReceiverStream<SignalResult>,
    debouncer: Arc<Debouncer>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            item = signals.next() => {
                match item {
                    Some(Ok(signal)) if signal.is_relevant_to(&path) => {
                        tracing::trace!("{:?} on {}", signal.kind, signal.path.display());
                        debouncer.signal();
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => tracing::warn!("File watcher error: {e}"),
                    None => break,
                }
            }
        }
    }
    tracing::debug!("Signal consumer stopped");
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;

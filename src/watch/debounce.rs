//! Debouncing of raw change signals.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Callback invoked once per debounced burst.
pub type ChangeCallback = Arc<dyn Fn() + Send + Sync>;

/// Policy for debouncing change signals.
///
/// Every relevant signal (re)starts a quiet window; the callback fires once
/// the window elapses with no further signal. A burst of signals spaced
/// closer than the window therefore produces one callback, fired one window
/// after the *last* signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebouncePolicy {
    /// The quiet window that must pass after the last signal.
    window: Duration,
}

impl DebouncePolicy {
    /// Creates a new debounce policy with the specified window duration.
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self { window }
    }

    /// Returns the debounce window duration.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }
}

impl Default for DebouncePolicy {
    /// A 500 ms window, long enough to absorb the write/create bursts an
    /// editor or `cp` produces for one logical rewrite.
    fn default() -> Self {
        Self {
            window: Duration::from_millis(500),
        }
    }
}

/// Debouncer state.
///
/// `Idle --signal--> Pending --signal--> Pending (re-armed)`
/// `Pending --window elapsed--> Idle (callback fired)`
/// `any --close--> Closed`
#[derive(Debug)]
enum State {
    /// No timer armed.
    Idle,
    /// A timer is armed; only the timer with this generation may fire.
    Pending {
        generation: u64,
        timer: JoinHandle<()>,
    },
    /// Shut down; signals are refused.
    Closed,
}

#[derive(Debug)]
struct Inner {
    state: State,
    next_generation: u64,
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cancel-and-rearm debouncer driving a single callback.
///
/// Each timer runs as its own Tokio task. When it wins, the callback runs
/// on the blocking pool, so a slow callback never stalls signal
/// consumption on the async workers. A callback already running when a new
/// signal arrives or [`close`](Self::close) is called runs to completion.
pub struct Debouncer {
    policy: DebouncePolicy,
    callback: ChangeCallback,
    runtime: Handle,
    inner: Arc<Mutex<Inner>>,
}

impl Debouncer {
    /// Creates an idle debouncer.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    #[must_use]
    pub fn new(policy: DebouncePolicy, callback: ChangeCallback) -> Self {
        Self {
            policy,
            callback,
            runtime: Handle::current(),
            inner: Arc::new(Mutex::new(Inner {
                state: State::Idle,
                next_generation: 0,
            })),
        }
    }

    /// Returns the debounce policy.
    #[must_use]
    pub const fn policy(&self) -> &DebouncePolicy {
        &self.policy
    }

    /// Records a relevant signal, arming or re-arming the timer.
    ///
    /// Returns `false` if the debouncer has been closed.
    pub fn signal(&self) -> bool {
        let mut inner = lock(&self.inner);

        match &inner.state {
            State::Closed => return false,
            State::Pending { timer, .. } => {
                tracing::trace!("Signal within debounce window, re-arming timer");
                timer.abort();
            }
            State::Idle => {
                tracing::trace!("Signal received, arming debounce timer");
            }
        }

        inner.next_generation += 1;
        let generation = inner.next_generation;
        let timer = self.runtime.spawn(fire_after(
            Arc::clone(&self.inner),
            Arc::clone(&self.callback),
            generation,
            self.policy.window(),
        ));
        inner.state = State::Pending { generation, timer };
        true
    }

    /// Returns true if a timer is armed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(lock(&self.inner).state, State::Pending { .. })
    }

    /// Returns true once [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(lock(&self.inner).state, State::Closed)
    }

    /// Cancels any armed timer and refuses further signals.
    ///
    /// Idempotent.
    pub fn close(&self) {
        let mut inner = lock(&self.inner);
        if let State::Pending { timer, .. } = &inner.state {
            timer.abort();
        }
        inner.state = State::Closed;
    }
}

impl std::fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("policy", &self.policy)
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.close();
    }
}

/// Timer task body: waits out the window, then fires if still current.
async fn fire_after(
    inner: Arc<Mutex<Inner>>,
    callback: ChangeCallback,
    generation: u64,
    window: Duration,
) {
    tokio::time::sleep(window).await;

    {
        let mut inner = lock(&inner);
        let current = matches!(
            inner.state,
            State::Pending { generation: armed, .. } if armed == generation
        );
        if !current {
            return;
        }
        inner.state = State::Idle;
    }

    tracing::debug!("Debounce window elapsed, firing change callback");
    if let Err(e) = tokio::task::spawn_blocking(move || callback()).await {
        tracing::error!("Change callback failed: {e}");
    }
}

#[cfg(test)]
#[path = "debounce_tests.rs"]
mod tests;

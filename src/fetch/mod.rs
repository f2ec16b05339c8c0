//! Async fetch lifecycle.
//!
//! A [`FetchController`] wraps one logical remote call (an [`Operation`]) and
//! owns its `data` / `loading` / `error` state.  Screens never call the
//! catalog directly: they hold a controller, trigger [`refetch`] or
//! [`reset`], and render [`snapshot`]s.
//!
//! ## Cancellation
//!
//! Every attempt carries its own [`CancellationToken`] and a generation
//! number.  After the operation settles, the attempt commits only if its
//! token is still live and its generation is the controller's latest.
//! [`reset`] and dropping the controller cancel the live token.  The
//! operation itself always runs to completion; only the local commit is
//! skipped.
//!
//! [`refetch`]: FetchController::refetch
//! [`reset`]: FetchController::reset
//! [`snapshot`]: FetchController::snapshot

mod operation;
mod state;

pub use operation::{Operation, OperationFuture};
pub use state::{FetchState, Phase};

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::FetchError;

struct Inner<T> {
    state: FetchState<T>,
    operation: Operation<T>,
    generation: u64,
    token: CancellationToken,
}

struct Shared<T> {
    inner: Mutex<Inner<T>>,
    tx: watch::Sender<FetchState<T>>,
}

impl<T: Clone> Shared<T> {
    fn publish(&self, state: &FetchState<T>) {
        self.tx.send_replace(state.clone());
    }
}

/// Identifies one call to [`FetchController::start`].
struct Attempt {
    generation: u64,
    token: CancellationToken,
}

impl Attempt {
    fn is_current<T>(&self, inner: &Inner<T>) -> bool {
        !self.token.is_cancelled() && self.generation == inner.generation
    }
}

/// Owns the lifecycle of a single logical fetch.
///
/// Dropping the controller is teardown: the live attempt is cancelled so a
/// late result is discarded, but the last published state is left alone.
pub struct FetchController<T> {
    shared: Arc<Shared<T>>,
    auto_start: bool,
}

impl<T> FetchController<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a controller around `operation`.
    ///
    /// With `auto_start` the first attempt is spawned immediately, which
    /// requires a Tokio runtime context.
    pub fn new(operation: Operation<T>, auto_start: bool) -> Self {
        let state = FetchState::default();
        let (tx, _rx) = watch::channel(state.clone());
        let controller = Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    state,
                    operation,
                    generation: 0,
                    token: CancellationToken::new(),
                }),
                tx,
            }),
            auto_start,
        };
        if auto_start {
            controller.refetch();
        }
        controller
    }

    /// Run one attempt to completion.
    ///
    /// Returns `Ok(Some(data))` when the result was committed, `Ok(None)`
    /// when the attempt was reset, torn down or superseded by a newer
    /// attempt, and `Err` when the operation failed and the failure was
    /// committed.
    ///
    /// The attempt runs on its own task, so dropping the returned future
    /// does not abandon it: the operation still settles and commits.
    pub async fn start(&self) -> Result<Option<T>, FetchError> {
        self.refetch()
            .await
            .map_err(|err| FetchError::Unknown(format!("fetch task failed: {err}")))?
    }

    /// Spawn one attempt in the background.
    pub fn refetch(&self) -> JoinHandle<Result<Option<T>, FetchError>> {
        tokio::spawn(run_attempt(Arc::clone(&self.shared)))
    }

    /// Cancel the live attempt and clear all visible state.
    pub fn reset(&self) {
        let mut inner = self.shared.inner.lock();
        inner.token.cancel();
        inner.state = FetchState::default();
        self.shared.publish(&inner.state);
    }

    /// Install a new operation.
    ///
    /// An operation that is the same as the current one (see
    /// [`Operation::same_as`]) is ignored and `false` is returned.  A changed
    /// operation replaces the current one and, with `auto_start`, triggers a
    /// fresh attempt.
    pub fn set_operation(&self, operation: Operation<T>) -> bool {
        {
            let mut inner = self.shared.inner.lock();
            if inner.operation.same_as(&operation) {
                return false;
            }
            debug!(key = operation.key(), "operation changed");
            inner.operation = operation;
        }
        if self.auto_start {
            self.refetch();
        }
        true
    }

    pub fn snapshot(&self) -> FetchState<T> {
        self.shared.inner.lock().state.clone()
    }

    /// Receiver notified on every published state change.
    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.shared.tx.subscribe()
    }

    pub fn operation_key(&self) -> String {
        self.shared.inner.lock().operation.key().to_string()
    }
}

impl<T> Drop for FetchController<T> {
    fn drop(&mut self) {
        self.shared.inner.lock().token.cancel();
    }
}

async fn run_attempt<T>(shared: Arc<Shared<T>>) -> Result<Option<T>, FetchError>
where
    T: Clone + Send + Sync + 'static,
{
    let (attempt, future, key) = {
        let mut inner = shared.inner.lock();
        inner.generation += 1;
        inner.token = CancellationToken::new();
        inner.state.loading = true;
        inner.state.error = None;
        shared.publish(&inner.state);

        let attempt = Attempt {
            generation: inner.generation,
            token: inner.token.clone(),
        };
        (attempt, inner.operation.invoke(), inner.operation.key().to_string())
    };

    let outcome = future.await;

    let mut inner = shared.inner.lock();
    if !attempt.is_current(&inner) {
        debug!(
            key = %key,
            generation = attempt.generation,
            cancelled = attempt.token.is_cancelled(),
            "discarding stale result"
        );
        return Ok(None);
    }

    inner.state.loading = false;
    let result = match outcome {
        Ok(data) => {
            inner.state.data = Some(data.clone());
            Ok(Some(data))
        }
        Err(err) => {
            warn!(key = %key, error = %err, "fetch failed");
            inner.state.error = Some(err.clone());
            Err(err)
        }
    };
    shared.publish(&inner.state);
    result
}

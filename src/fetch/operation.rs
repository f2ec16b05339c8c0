//! The zero-argument async operation a controller drives.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::FetchError;

/// Boxed future produced by one invocation of an [`Operation`].
pub type OperationFuture<T> = BoxFuture<'static, Result<T, FetchError>>;

/// A shareable async operation plus an identity key.
///
/// Two operations are "the same" when they share the same closure or carry
/// equal keys.  Callers pick a key that captures every input the closure
/// closes over (e.g. `"search:batman"`), so re-supplying an equal operation
/// does not restart a controller.
pub struct Operation<T> {
    key: String,
    run: Arc<dyn Fn() -> OperationFuture<T> + Send + Sync>,
}

impl<T> Operation<T> {
    pub fn new<F, Fut>(key: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        Self {
            key: key.into(),
            run: Arc::new(move || f().boxed()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Identity check used when a caller re-supplies an operation.
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.run, &other.run) || self.key == other.key
    }

    pub(crate) fn invoke(&self) -> OperationFuture<T> {
        (self.run)()
    }
}

impl<T> Clone for Operation<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            run: Arc::clone(&self.run),
        }
    }
}

impl<T> fmt::Debug for Operation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation").field("key", &self.key).finish()
    }
}

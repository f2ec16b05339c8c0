//! The observable state published by a [`FetchController`](super::FetchController).

use crate::error::FetchError;

/// Where a controller is in its lifecycle, derived from a [`FetchState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing started yet, or the controller was reset.
    Idle,
    /// An attempt is in flight.
    Loading,
    /// The last attempt committed data.
    Succeeded,
    /// The last attempt committed an error.
    Failed,
}

/// Snapshot of a single logical fetch.
///
/// `data` holds the last committed success and survives a later failure;
/// `error` is cleared whenever a new attempt starts.  Both are `None` before
/// the first attempt and after a reset.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    /// Last successful result.
    pub data: Option<T>,
    /// Whether the current attempt is still running.
    pub loading: bool,
    /// Last failure, if the most recent attempt failed.
    pub error: Option<FetchError>,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> FetchState<T> {
    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Failed
        } else if self.data.is_some() {
            Phase::Succeeded
        } else {
            Phase::Idle
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase() == Phase::Idle
    }
}

//! Messages from background tasks to the UI loop.
//!
//! Background work (debounce timers, analytics writes) never touches
//! [`App`](crate::app::App) directly.  It sends an [`AppEvent`] over an
//! unbounded channel and the main loop drains the channel once per tick.

use tokio::sync::mpsc;

use crate::error::FetchError;

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Search input has been quiet for the debounce period.
    SearchSettled(String),
    /// An analytics write for `query` finished.
    SearchRecorded {
        query: String,
        result: Result<(), FetchError>,
    },
}

pub type EventSender = mpsc::UnboundedSender<AppEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<AppEvent>;

pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

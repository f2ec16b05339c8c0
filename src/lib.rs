//! reelscroll: a terminal movie browser.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌────────────┐  Operation  ┌─────────────────┐ snapshot() ┌──────────┐
//! │ catalog/   │ ◄────────── │ fetch::         │ ─────────► │  ui.rs   │
//! │ analytics/ │             │ FetchController │            │ (render) │
//! └────────────┘             └─────────────────┘            └──────────┘
//!                                    ▲ refetch()/reset()
//!                               ┌──────────┐  AppEvent  ┌─────────────┐
//!                               │  app.rs  │ ◄───────── │ debounce.rs │
//!                               │ (state)  │ (channel)  │ background  │
//!                               └──────────┘            └─────────────┘
//!                                    ▲ handle_key_event()
//!                               ┌──────────┐
//!                               │ input.rs │
//!                               └──────────┘
//! ```
//!
//! * **`fetch`**: the generic async-state controller with cancellation.
//! * **`catalog`**: the `MovieCatalog` trait and the TMDB client.
//! * **`analytics`**: the `SearchLog` trait: search counts and trending.
//! * **`debounce`** / **`events`**: caller-side input quiescence and the
//!   channel background tasks use to reach the UI loop.
//! * **`app`**: owns all application state (controllers, selection, query).
//! * **`ui`**: pure rendering: reads `App` state and draws widgets.
//! * **`input`**: maps key events to `App` mutations.
//! * **`config`** / **`logging`**: settings layering and file-only tracing.

pub mod analytics;
pub mod app;
pub mod catalog;
pub mod config;
pub mod debounce;
pub mod error;
pub mod events;
pub mod fetch;
pub mod input;
pub mod logging;
pub mod ui;

#[cfg(test)]
mod test_support;

pub use error::FetchError;

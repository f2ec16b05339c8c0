//! Search analytics.
//!
//! Every successful search is counted per distinct search term; the terms
//! with the highest counts are shown as "trending".  [`SearchLog`] is the
//! seam: [`AppwriteSearchLog`] persists to a hosted table, while
//! [`MemorySearchLog`] keeps counts for the lifetime of the process (used
//! when no backend is configured, and in tests).
//!
//! Neither implementation is transactional.  Two identical searches racing
//! each other can both miss the lookup and insert two rows, or lose an
//! increment.

mod appwrite;
mod memory;
mod record;

pub use appwrite::{AppwriteConfig, AppwriteSearchLog};
pub use memory::MemorySearchLog;
pub use record::SearchRecord;

use async_trait::async_trait;

use crate::catalog::Movie;
use crate::error::Result;

/// Number of records shown in the trending row.
pub const DEFAULT_TRENDING_LIMIT: usize = 5;

#[async_trait]
pub trait SearchLog: Send + Sync {
    fn name(&self) -> &str;

    /// Count one search for `query`.
    ///
    /// Increments the record whose search term equals `query` exactly, or
    /// inserts a new record with `count = 1` describing `movie` (the first
    /// result of the search).
    async fn record_search(&self, query: &str, movie: &Movie) -> Result<()>;

    /// Records with the highest counts, highest first, at most `limit`.
    async fn top_trending(&self, limit: usize) -> Result<Vec<SearchRecord>>;
}

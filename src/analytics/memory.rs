use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use super::{SearchLog, SearchRecord};
use crate::catalog::Movie;
use crate::error::Result;

/// Process-local search counts.
///
/// Ties in `count` keep insertion order.
#[derive(Debug, Default)]
pub struct MemorySearchLog {
    records: Mutex<Vec<SearchRecord>>,
}

impl MemorySearchLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<SearchRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl SearchLog for MemorySearchLog {
    fn name(&self) -> &str {
        "memory"
    }

    async fn record_search(&self, query: &str, movie: &Movie) -> Result<()> {
        let mut records = self.records.lock();
        match records.iter_mut().find(|r| r.search_term == query) {
            Some(existing) => existing.count += 1,
            None => records.push(SearchRecord::first_sight(
                Uuid::new_v4().simple().to_string(),
                query,
                movie,
            )),
        }
        Ok(())
    }

    async fn top_trending(&self, limit: usize) -> Result<Vec<SearchRecord>> {
        let mut records = self.records.lock().clone();
        records.sort_by(|a, b| b.count.cmp(&a.count));
        records.truncate(limit);
        Ok(records)
    }
}

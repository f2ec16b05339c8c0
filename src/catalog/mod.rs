//! Movie catalog access.
//!
//! This module defines the [`MovieCatalog`] trait and the payload types in
//! [`movie`].  The only implementation talks to a TMDB-compatible REST API
//! ([`TmdbClient`]); screens hold an `Arc<dyn MovieCatalog>` so tests can
//! substitute their own.
//!
//! ## Adding a catalog
//!
//! 1. Create a new file in this directory.
//! 2. Implement [`MovieCatalog`] for a struct holding its HTTP client and
//!    credentials, returning [`FetchError`](crate::error::FetchError)s.
//! 3. Re-export it below and construct it in `main.rs`.

pub mod movie;
mod tmdb;

pub use movie::{Movie, MovieDetails};
pub use tmdb::TmdbClient;

use async_trait::async_trait;

use crate::error::Result;

/// A read-only source of movies.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Human-readable label for status messages.
    fn name(&self) -> &str;

    /// Search by title when `query` is non-blank, otherwise list the most
    /// popular movies.  Returns the first page of results.
    async fn search_or_list_movies(&self, query: &str) -> Result<Vec<Movie>>;

    /// Fetch the detail payload for one movie.
    async fn movie_details(&self, movie_id: i64) -> Result<MovieDetails>;
}

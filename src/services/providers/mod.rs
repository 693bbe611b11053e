//! Book catalog abstraction
//!
//! The recommendation pipeline only needs a genre-subject search; the
//! free-text search backs the public search endpoint.
use std::collections::HashSet;

use crate::{error::AppResult, models::Book};

pub mod google_books;

pub use google_books::GoogleBooksProvider;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Search for books tagged with any of `genres`
    ///
    /// Callers pass at most three genres. Implementations drop books whose id
    /// is in `exclude_ids` and return at most `limit` books.
    async fn search_by_genres(
        &self,
        genres: &[String],
        exclude_ids: &HashSet<String>,
        limit: usize,
    ) -> AppResult<Vec<Book>>;

    /// Free-text search, paged by `start_index`
    async fn search_books(&self, query: &str, start_index: u32) -> AppResult<Vec<Book>>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

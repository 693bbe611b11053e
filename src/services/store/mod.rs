//! Reader data collaborators
//!
//! Everything the recommendation pipeline knows about a reader comes through
//! these traits. `Ok(None)` means the reader has no row yet; callers treat it
//! the same as a failed lookup and fall back to defaults.
use std::collections::HashSet;

use crate::{
    error::AppResult,
    models::{Book, GenreWeights, ReadingPattern, ReadingStatus, UserPreferences},
};

pub mod postgres;

pub use postgres::PgReaderStore;

/// Precomputed similar books never exceed this many per lookup
pub const SIMILAR_BOOKS_CAP: usize = 10;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn user_preferences(&self, user_id: &str) -> AppResult<Option<UserPreferences>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ReadingPatternStore: Send + Sync {
    async fn reading_pattern(&self, user_id: &str) -> AppResult<Option<ReadingPattern>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait GenreWeightStore: Send + Sync {
    async fn genre_weights(&self, user_id: &str) -> AppResult<GenreWeights>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SimilarityLookup: Send + Sync {
    /// Books precomputed as similar to `book_ids`, at most [`SIMILAR_BOOKS_CAP`]
    async fn similar_books(&self, book_ids: &[String]) -> AppResult<Vec<Book>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ExclusionStore: Send + Sync {
    /// Ids the reader should never be recommended: books already on their
    /// shelves, dismissed recommendations, and books they gave negative
    /// feedback on
    async fn excluded_book_ids(&self, user_id: &str) -> AppResult<HashSet<String>>;
}

/// Reader-owned shelf data: reading status, ratings, dismissals and feedback
///
/// Writes that take a whole [`Book`] first make sure the book is in the book
/// table and return the id it is stored under. That id differs from
/// `book.id` when another record already holds the same ISBN.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ReaderShelfStore: Send + Sync {
    /// Puts `book` on the reader's shelf, replacing any earlier status
    async fn set_reading_status(
        &self,
        user_id: &str,
        book: &Book,
        status: ReadingStatus,
    ) -> AppResult<String>;

    /// Takes a book off the shelf and forgets its rating
    async fn remove_book(&self, user_id: &str, book_id: &str) -> AppResult<()>;

    /// Books on the shelf with `status`, most recently updated first
    async fn shelf_books(&self, user_id: &str, status: ReadingStatus) -> AppResult<Vec<Book>>;

    /// Stores or replaces the reader's rating for a book
    async fn rate_book(&self, user_id: &str, book_id: &str, rating: i16) -> AppResult<()>;

    async fn book_rating(&self, user_id: &str, book_id: &str) -> AppResult<Option<i16>>;

    async fn dismiss_recommendation(&self, user_id: &str, book: &Book) -> AppResult<String>;

    async fn add_negative_feedback(&self, user_id: &str, book: &Book) -> AppResult<String>;
}

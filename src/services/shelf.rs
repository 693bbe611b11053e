//! Reader shelf operations
//!
//! Everything written here feeds the recommendation exclusion set: books on
//! a shelf, dismissed recommendations and negative feedback are never
//! recommended again.
use crate::{
    error::{AppError, AppResult},
    models::{Book, ReadingStatus, ShelfUpdate, MAX_RATING, MIN_RATING},
    services::store::ReaderShelfStore,
};

fn require_user_id(user_id: &str) -> AppResult<&str> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::InvalidInput("user id cannot be empty".to_string()));
    }
    Ok(user_id)
}

fn require_book_id(book_id: &str) -> AppResult<&str> {
    let book_id = book_id.trim();
    if book_id.is_empty() {
        return Err(AppError::InvalidInput("book id cannot be empty".to_string()));
    }
    Ok(book_id)
}

/// Moves `book` to a shelf, or off every shelf for [`ShelfUpdate::Remove`]
pub async fn update_reading_status(
    store: &dyn ReaderShelfStore,
    user_id: &str,
    book: &Book,
    update: ShelfUpdate,
) -> AppResult<()> {
    let user_id = require_user_id(user_id)?;
    let book_id = require_book_id(&book.id)?;

    match update.status() {
        Some(status) => {
            let stored_id = store.set_reading_status(user_id, book, status).await?;
            tracing::info!(
                user_id,
                book_id = %stored_id,
                status = status.as_str(),
                "Reading status updated"
            );
        }
        None => {
            store.remove_book(user_id, book_id).await?;
            tracing::info!(user_id, book_id, "Book removed from shelf");
        }
    }
    Ok(())
}

pub async fn remove_book(
    store: &dyn ReaderShelfStore,
    user_id: &str,
    book_id: &str,
) -> AppResult<()> {
    let user_id = require_user_id(user_id)?;
    let book_id = require_book_id(book_id)?;
    store.remove_book(user_id, book_id).await?;
    tracing::info!(user_id, book_id, "Book removed from shelf");
    Ok(())
}

/// Reading list (`want_to_read`) or reading history (`read`)
pub async fn shelf_books(
    store: &dyn ReaderShelfStore,
    user_id: &str,
    status: ReadingStatus,
) -> AppResult<Vec<Book>> {
    let user_id = require_user_id(user_id)?;
    store.shelf_books(user_id, status).await
}

/// Stores a star rating between [`MIN_RATING`] and [`MAX_RATING`]
pub async fn rate_book(
    store: &dyn ReaderShelfStore,
    user_id: &str,
    book_id: &str,
    rating: i16,
) -> AppResult<()> {
    let user_id = require_user_id(user_id)?;
    let book_id = require_book_id(book_id)?;
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::InvalidInput(format!(
            "rating must be between {} and {}",
            MIN_RATING, MAX_RATING
        )));
    }

    store.rate_book(user_id, book_id, rating).await?;
    tracing::info!(user_id, book_id, rating, "Book rated");
    Ok(())
}

pub async fn book_rating(
    store: &dyn ReaderShelfStore,
    user_id: &str,
    book_id: &str,
) -> AppResult<Option<i16>> {
    let user_id = require_user_id(user_id)?;
    let book_id = require_book_id(book_id)?;
    store.book_rating(user_id, book_id).await
}

pub async fn dismiss_recommendation(
    store: &dyn ReaderShelfStore,
    user_id: &str,
    book: &Book,
) -> AppResult<()> {
    let user_id = require_user_id(user_id)?;
    require_book_id(&book.id)?;
    let stored_id = store.dismiss_recommendation(user_id, book).await?;
    tracing::info!(user_id, book_id = %stored_id, "Recommendation dismissed");
    Ok(())
}

pub async fn add_negative_feedback(
    store: &dyn ReaderShelfStore,
    user_id: &str,
    book: &Book,
) -> AppResult<()> {
    let user_id = require_user_id(user_id)?;
    require_book_id(&book.id)?;
    let stored_id = store.add_negative_feedback(user_id, book).await?;
    tracing::info!(user_id, book_id = %stored_id, "Negative feedback recorded");
    Ok(())
}

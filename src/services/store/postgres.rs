use std::collections::HashSet;

use sqlx::PgPool;

use super::{
    ExclusionStore, GenreWeightStore, PreferenceStore, ReadingPatternStore, ReaderShelfStore,
    SimilarityLookup, SIMILAR_BOOKS_CAP,
};
use crate::{
    error::AppResult,
    models::{
        Book, GenreWeights, ReadingPattern, ReadingStatus, UserPreferences, DEFAULT_READING_LEVEL,
    },
};

/// PostgreSQL-backed implementation of every reader store
///
/// Tables are laid out in `migrations/`. One pool serves all lookups.
#[derive(Clone)]
pub struct PgReaderStore {
    pool: PgPool,
}

impl PgReaderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Id under which `book` is stored, inserting it when unknown
    ///
    /// A record with the same id wins, then a record with the same ISBN.
    async fn ensure_book_exists(&self, book: &Book) -> AppResult<String> {
        let existing: Option<String> = sqlx::query_scalar(
            r#"
            SELECT id
            FROM books
            WHERE id = $1 OR ($2 <> '' AND isbn = $2)
            ORDER BY (id = $1) DESC
            LIMIT 1
            "#,
        )
        .bind(&book.id)
        .bind(&book.isbn)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(id) = existing {
            return Ok(id);
        }

        sqlx::query(
            r#"
            INSERT INTO books
                (id, title, author, cover_url, description, isbn,
                 publication_year, genres, reading_level)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.cover_url)
        .bind(&book.description)
        .bind(&book.isbn)
        .bind(book.publication_year)
        .bind(&book.genres)
        .bind(&book.reading_level)
        .execute(&self.pool)
        .await?;

        tracing::debug!(book_id = %book.id, "Book stored");
        Ok(book.id.clone())
    }
}

#[async_trait::async_trait]
impl PreferenceStore for PgReaderStore {
    async fn user_preferences(&self, user_id: &str) -> AppResult<Option<UserPreferences>> {
        let prefs = sqlx::query_as::<_, UserPreferences>(
            r#"
            SELECT
                COALESCE(favorite_genres, '{}') AS favorite_genres,
                COALESCE(favorite_authors, '{}') AS favorite_authors,
                COALESCE(reading_level, $2) AS reading_level
            FROM user_preferences
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(DEFAULT_READING_LEVEL)
        .fetch_optional(&self.pool)
        .await?;

        Ok(prefs)
    }
}

#[async_trait::async_trait]
impl ReadingPatternStore for PgReaderStore {
    async fn reading_pattern(&self, user_id: &str) -> AppResult<Option<ReadingPattern>> {
        let pattern = sqlx::query_as::<_, ReadingPattern>(
            r#"
            SELECT total_books_read, avg_reading_hours, preferred_genre,
                   avg_pages_per_session, completed_sessions, abandoned_sessions
            FROM user_reading_patterns
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(pattern)
    }
}

#[async_trait::async_trait]
impl GenreWeightStore for PgReaderStore {
    async fn genre_weights(&self, user_id: &str) -> AppResult<GenreWeights> {
        let rows: Vec<(String, f64)> = sqlx::query_as(
            r#"
            SELECT genre, weight
            FROM genre_preferences
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}

#[async_trait::async_trait]
impl SimilarityLookup for PgReaderStore {
    async fn similar_books(&self, book_ids: &[String]) -> AppResult<Vec<Book>> {
        if book_ids.is_empty() {
            return Ok(Vec::new());
        }

        // A book similar to several inputs is returned once, at its best similarity.
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT b.id, b.title, b.author, b.cover_url, b.description, b.isbn,
                   b.publication_year, b.genres, b.reading_level
            FROM books b
            JOIN (
                SELECT similar_book_id, MAX(similarity) AS similarity
                FROM book_similarities
                WHERE book_id = ANY($1)
                GROUP BY similar_book_id
            ) s ON s.similar_book_id = b.id
            ORDER BY s.similarity DESC, b.id
            LIMIT $2
            "#,
        )
        .bind(book_ids)
        .bind(SIMILAR_BOOKS_CAP as i64)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(
            inputs = book_ids.len(),
            similar = books.len(),
            "Similar books loaded"
        );

        Ok(books)
    }
}

#[async_trait::async_trait]
impl ExclusionStore for PgReaderStore {
    async fn excluded_book_ids(&self, user_id: &str) -> AppResult<HashSet<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT book_id FROM reading_status WHERE user_id = $1
            UNION
            SELECT book_id FROM dismissed_recommendations WHERE user_id = $1
            UNION
            SELECT book_id FROM book_feedback
            WHERE user_id = $1 AND feedback_type = 'negative'
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }
}

#[async_trait::async_trait]
impl ReaderShelfStore for PgReaderStore {
    async fn set_reading_status(
        &self,
        user_id: &str,
        book: &Book,
        status: ReadingStatus,
    ) -> AppResult<String> {
        let book_id = self.ensure_book_exists(book).await?;

        sqlx::query(
            r#"
            INSERT INTO reading_status (user_id, book_id, status, updated_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (user_id, book_id)
            DO UPDATE SET status = EXCLUDED.status, updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(&book_id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;

        Ok(book_id)
    }

    async fn remove_book(&self, user_id: &str, book_id: &str) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM reading_status WHERE user_id = $1 AND book_id = $2")
            .bind(user_id)
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM book_ratings WHERE user_id = $1 AND book_id = $2")
            .bind(user_id)
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn shelf_books(&self, user_id: &str, status: ReadingStatus) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT b.id, b.title, b.author, b.cover_url, b.description, b.isbn,
                   b.publication_year, b.genres, b.reading_level
            FROM reading_status r
            JOIN books b ON b.id = r.book_id
            WHERE r.user_id = $1 AND r.status = $2
            ORDER BY r.updated_at DESC, b.id
            "#,
        )
        .bind(user_id)
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    async fn rate_book(&self, user_id: &str, book_id: &str, rating: i16) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO book_ratings (user_id, book_id, rating, updated_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (user_id, book_id)
            DO UPDATE SET rating = EXCLUDED.rating, updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(rating)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn book_rating(&self, user_id: &str, book_id: &str) -> AppResult<Option<i16>> {
        let rating: Option<i16> = sqlx::query_scalar(
            "SELECT rating FROM book_ratings WHERE user_id = $1 AND book_id = $2",
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rating)
    }

    async fn dismiss_recommendation(&self, user_id: &str, book: &Book) -> AppResult<String> {
        let book_id = self.ensure_book_exists(book).await?;

        sqlx::query(
            r#"
            INSERT INTO dismissed_recommendations (user_id, book_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, book_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(&book_id)
        .execute(&self.pool)
        .await?;

        Ok(book_id)
    }

    async fn add_negative_feedback(&self, user_id: &str, book: &Book) -> AppResult<String> {
        let book_id = self.ensure_book_exists(book).await?;

        sqlx::query(
            r#"
            INSERT INTO book_feedback (user_id, book_id, feedback_type)
            VALUES ($1, $2, 'negative')
            ON CONFLICT (user_id, book_id)
            DO UPDATE SET feedback_type = 'negative', created_at = now()
            "#,
        )
        .bind(user_id)
        .bind(&book_id)
        .execute(&self.pool)
        .await?;

        Ok(book_id)
    }
}

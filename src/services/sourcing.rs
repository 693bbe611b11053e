//! Candidate sourcing
//!
//! Both sources are best effort: a failed lookup is logged and yields no
//! candidates instead of failing the recommendation request.
use std::collections::HashSet;

use crate::{
    models::Book,
    services::{
        providers::CatalogProvider,
        store::{SimilarityLookup, SIMILAR_BOOKS_CAP},
    },
};

/// Genres beyond this many make catalog queries too broad to be useful
pub const MAX_QUERY_GENRES: usize = 3;

/// Deduplicates `genres` keeping first occurrences, then keeps the first three
pub fn query_genres(genres: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    genres
        .iter()
        .filter(|genre| seen.insert(genre.as_str()))
        .take(MAX_QUERY_GENRES)
        .cloned()
        .collect()
}

/// Catalog books matching any of `genres`, minus excluded ids
pub async fn genre_candidates(
    catalog: &dyn CatalogProvider,
    genres: &[String],
    exclude_ids: &HashSet<String>,
    limit: usize,
) -> Vec<Book> {
    let genres = query_genres(genres);
    if genres.is_empty() {
        return Vec::new();
    }

    match catalog.search_by_genres(&genres, exclude_ids, limit).await {
        Ok(books) => {
            let books: Vec<Book> = books
                .into_iter()
                .filter(|book| !exclude_ids.contains(&book.id))
                .take(limit)
                .collect();
            tracing::debug!(
                genres = ?genres,
                found = books.len(),
                provider = catalog.name(),
                "Genre candidates sourced"
            );
            books
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                genres = ?genres,
                provider = catalog.name(),
                "Genre search failed, continuing without genre candidates"
            );
            Vec::new()
        }
    }
}

/// Precomputed similar books for the given prior reads
pub async fn similar_candidates(lookup: &dyn SimilarityLookup, book_ids: &[String]) -> Vec<Book> {
    if book_ids.is_empty() {
        return Vec::new();
    }

    match lookup.similar_books(book_ids).await {
        Ok(mut books) => {
            books.truncate(SIMILAR_BOOKS_CAP);
            tracing::debug!(found = books.len(), "Similar candidates sourced");
            books
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                inputs = book_ids.len(),
                "Similar book lookup failed, continuing without similar candidates"
            );
            Vec::new()
        }
    }
}

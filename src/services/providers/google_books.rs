//! Google Books catalog provider
//!
//! Both searches go through `GET /volumes`:
//! 1. Genre search: `subject:"A" OR subject:"B"` for the recommendation pipeline
//! 2. Free-text search: the raw query for the search endpoint
//!
//! Volume ids are mapped to stable book ids by [`Book::from`].
use std::collections::HashSet;

use reqwest::Client as HttpClient;
use tracing::instrument;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{ApiVolumeList, Book},
    services::providers::CatalogProvider,
};

const SEARCH_CACHE_TTL: u64 = 3600; // 1 hour

/// Google caps `maxResults` at 40 per page
const MAX_RESULTS_PER_PAGE: usize = 40;

const VOLUME_FIELDS: &str = "items(id,volumeInfo),totalItems";

#[derive(Clone)]
pub struct GoogleBooksProvider {
    http_client: HttpClient,
    api_url: String,
    api_key: Option<String>,
    cache: Cache,
}

impl GoogleBooksProvider {
    pub fn new(cache: Cache, api_url: String, api_key: Option<String>) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            cache,
        }
    }

    #[instrument(skip(self), fields(provider = "google_books"))]
    async fn fetch_volumes(
        &self,
        query: &str,
        start_index: u32,
        max_results: usize,
    ) -> AppResult<Vec<Book>> {
        let url = format!("{}/volumes", self.api_url);

        let mut params = vec![
            ("q", query.to_string()),
            ("startIndex", start_index.to_string()),
            ("maxResults", max_results.to_string()),
            ("fields", VOLUME_FIELDS.to_string()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("key", key.clone()));
        }

        let response = self.http_client.get(&url).query(&params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Catalog(format!(
                "Google Books returned status {}: {}",
                status, body
            )));
        }

        let list: ApiVolumeList = response.json().await?;
        let books: Vec<Book> = list
            .items
            .unwrap_or_default()
            .into_iter()
            .map(Book::from)
            .collect();

        tracing::info!(
            query = %query,
            start_index,
            results = books.len(),
            provider = self.name(),
            "Catalog search completed"
        );

        Ok(books)
    }
}

/// Builds the OR-joined subject query for a genre search
fn genre_subject_query(genres: &[String]) -> String {
    genres
        .iter()
        .map(|genre| format!("subject:\"{}\"", genre))
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Over-fetch so that excluded books can be dropped and still fill `limit`
fn genre_page_size(limit: usize) -> usize {
    limit.saturating_mul(2).clamp(1, MAX_RESULTS_PER_PAGE)
}

#[async_trait::async_trait]
impl CatalogProvider for GoogleBooksProvider {
    async fn search_by_genres(
        &self,
        genres: &[String],
        exclude_ids: &HashSet<String>,
        limit: usize,
    ) -> AppResult<Vec<Book>> {
        if genres.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let query = genre_subject_query(genres);
        let page_size = genre_page_size(limit);

        // Cached before exclusion: exclude lists are per user, results are not.
        let books: Vec<Book> = cached!(
            self.cache,
            CacheKey::GenreSearch {
                genres: genres.to_vec(),
                limit,
            },
            SEARCH_CACHE_TTL,
            async { self.fetch_volumes(&query, 0, page_size).await }
        )?;

        Ok(books
            .into_iter()
            .filter(|book| !exclude_ids.contains(&book.id))
            .take(limit)
            .collect())
    }

    async fn search_books(&self, query: &str, start_index: u32) -> AppResult<Vec<Book>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        cached!(
            self.cache,
            CacheKey::BookSearch {
                query: query.to_string(),
                start_index,
            },
            SEARCH_CACHE_TTL,
            async {
                self.fetch_volumes(query, start_index, MAX_RESULTS_PER_PAGE)
                    .await
            }
        )
    }

    fn name(&self) -> &'static str {
        "google_books"
    }
}

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use crate::{
    models::{Book, CategoryFilter, GenreWeights, ReadingPattern, UserPreferences},
    services::{
        pool::build_candidate_pool,
        providers::CatalogProvider,
        ranking::rank_and_filter,
        scoring::PersonalizedScorer,
        sourcing::{genre_candidates, similar_candidates},
        store::{GenreWeightStore, PreferenceStore, ReadingPatternStore, SimilarityLookup},
    },
};

/// Genre-matched catalog books pulled per request unless configured otherwise
pub const DEFAULT_GENRE_CANDIDATE_LIMIT: usize = 20;

/// One recommendation request
#[derive(Debug, Clone, Default)]
pub struct RecommendationQuery {
    /// Signed-in reader, `None` for anonymous visitors
    pub user_id: Option<String>,
    /// Books the reader recently read, rated or picked
    pub recent_books: Vec<Book>,
    /// Ids that must never be recommended
    pub exclude_ids: Vec<String>,
    pub filter: Option<CategoryFilter>,
}

/// Everything known about the reader for one request
#[derive(Debug, Clone, Default)]
struct ReaderContext {
    preferences: Option<UserPreferences>,
    reading_pattern: Option<ReadingPattern>,
    genre_weights: GenreWeights,
}

/// Reader-facing collaborators the engine pulls from
#[derive(Clone)]
pub struct ReaderStores {
    pub preferences: Arc<dyn PreferenceStore>,
    pub reading_patterns: Arc<dyn ReadingPatternStore>,
    pub genre_weights: Arc<dyn GenreWeightStore>,
    pub similar_books: Arc<dyn SimilarityLookup>,
}

/// Generates personalized book recommendations
///
/// Sources candidates from the catalog (by genre) and from precomputed
/// similar books, scores each against the reader, and returns the best ten.
/// Every failure degrades to fewer or no recommendations; the engine never
/// returns an error.
#[derive(Clone)]
pub struct RecommendationEngine {
    catalog: Arc<dyn CatalogProvider>,
    stores: ReaderStores,
    genre_candidate_limit: usize,
}

impl RecommendationEngine {
    pub fn new(catalog: Arc<dyn CatalogProvider>, stores: ReaderStores) -> Self {
        Self {
            catalog,
            stores,
            genre_candidate_limit: DEFAULT_GENRE_CANDIDATE_LIMIT,
        }
    }

    pub fn with_genre_candidate_limit(mut self, limit: usize) -> Self {
        self.genre_candidate_limit = limit;
        self
    }

    /// Ranked recommendations for `query`, possibly empty
    pub async fn get_recommendations(&self, query: RecommendationQuery) -> Vec<Book> {
        let user_id = query.user_id.clone();
        let engine = self.clone();

        // Run on its own task so that a panic anywhere in the pipeline
        // surfaces as a JoinError here instead of unwinding into the caller.
        match tokio::spawn(async move { engine.recommend(query).await }).await {
            Ok(books) => books,
            Err(e) => {
                tracing::error!(
                    user_id = ?user_id,
                    error = %e,
                    "Recommendation pipeline failed, returning no recommendations"
                );
                Vec::new()
            }
        }
    }

    async fn recommend(&self, query: RecommendationQuery) -> Vec<Book> {
        let start = Instant::now();
        let RecommendationQuery {
            user_id,
            recent_books,
            exclude_ids,
            filter,
        } = query;

        if user_id.is_none() && recent_books.is_empty() {
            tracing::debug!("Anonymous request without reading history, nothing to recommend");
            return Vec::new();
        }

        let reader = match user_id.as_deref() {
            Some(user_id) => self.load_reader(user_id).await,
            None => ReaderContext::default(),
        };

        let genres = candidate_genres(reader.preferences.as_ref(), &recent_books);
        if genres.is_empty() && recent_books.is_empty() {
            tracing::debug!(user_id = ?user_id, "No genres or reading history, nothing to recommend");
            return Vec::new();
        }

        let exclude_ids: HashSet<String> = exclude_ids.into_iter().collect();
        let recent_ids: Vec<String> = recent_books.iter().map(|b| b.id.clone()).collect();

        let (genre_matched, similar) = tokio::join!(
            genre_candidates(
                self.catalog.as_ref(),
                &genres,
                &exclude_ids,
                self.genre_candidate_limit,
            ),
            similar_candidates(self.stores.similar_books.as_ref(), &recent_ids),
        );

        let similar_count = similar.len();
        let genre_count = genre_matched.len();
        let pool = build_candidate_pool(similar, genre_matched, &exclude_ids);
        let pool_size = pool.len();

        let preferences = reader.preferences.unwrap_or_default();
        let scored = PersonalizedScorer::for_current_year().score_all(
            pool,
            &preferences,
            reader.reading_pattern.as_ref(),
            &reader.genre_weights,
        );

        let recommendations = rank_and_filter(scored, filter);

        tracing::info!(
            user_id = ?user_id,
            recent_books = recent_books.len(),
            genres = ?genres,
            similar_candidates = similar_count,
            genre_candidates = genre_count,
            pool = pool_size,
            recommended = recommendations.len(),
            filter = ?filter,
            processing_time_ms = start.elapsed().as_millis(),
            "Recommendations generated"
        );

        recommendations
    }

    /// Loads preferences, reading pattern and genre weights concurrently
    ///
    /// Missing rows and failed lookups both fall back to defaults.
    async fn load_reader(&self, user_id: &str) -> ReaderContext {
        let (preferences, reading_pattern, genre_weights) = tokio::join!(
            self.stores.preferences.user_preferences(user_id),
            self.stores.reading_patterns.reading_pattern(user_id),
            self.stores.genre_weights.genre_weights(user_id),
        );

        let preferences = preferences
            .unwrap_or_else(|e| {
                tracing::warn!(user_id, error = %e, "Preference lookup failed, using defaults");
                None
            })
            .unwrap_or_default();

        let reading_pattern = reading_pattern
            .unwrap_or_else(|e| {
                tracing::warn!(user_id, error = %e, "Reading pattern lookup failed, using defaults");
                None
            })
            .unwrap_or_default();

        let genre_weights = genre_weights.unwrap_or_else(|e| {
            tracing::warn!(user_id, error = %e, "Genre weight lookup failed, using no weights");
            GenreWeights::new()
        });

        ReaderContext {
            preferences: Some(preferences),
            reading_pattern: Some(reading_pattern),
            genre_weights,
        }
    }
}

/// Genres to search the catalog with
///
/// A signed-in reader's favorite genres, even when that list is empty.
/// Anonymous callers have no preferences and get every genre across their
/// recent books instead. First occurrences are kept in order.
fn candidate_genres(preferences: Option<&UserPreferences>, recent_books: &[Book]) -> Vec<String> {
    let source: Vec<&String> = match preferences {
        Some(prefs) => prefs.favorite_genres.iter().collect(),
        None => recent_books.iter().flat_map(|b| b.genres.iter()).collect(),
    };

    let mut seen = HashSet::new();
    source
        .into_iter()
        .filter(|genre| seen.insert(genre.as_str()))
        .cloned()
        .collect()
}

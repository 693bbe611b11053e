//! Personalized relevance scoring
//!
//! A linear blend of four signals, each bounded by its weight:
//! genre overlap, favorite author, reading level, and publication recency.
use chrono::Datelike;
use thiserror::Error;

use crate::models::{Book, GenreWeights, ReadingPattern, ScoredBook, UserPreferences};

/// Score given when no signal matches, and whenever a book cannot be scored
pub const FLOOR_SCORE: f64 = 0.1;

/// Recency is measured from this year
const RECENCY_BASE_YEAR: i32 = 1900;

/// Genre weight used for a favorite genre the reader never weighted
const DEFAULT_GENRE_WEIGHT: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub genre_match: f64,
    pub author_match: f64,
    pub reading_level: f64,
    pub recency: f64,
}

impl ScoreWeights {
    pub fn sum(&self) -> f64 {
        self.genre_match + self.author_match + self.reading_level + self.recency
    }
}

pub const SCORE_WEIGHTS: ScoreWeights = ScoreWeights {
    genre_match: 0.4,
    author_match: 0.3,
    reading_level: 0.2,
    recency: 0.1,
};

#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    #[error("genre weight for {genre:?} is not a finite number")]
    InvalidGenreWeight { genre: String },
    #[error("current year {0} is not after 1900")]
    InvalidCurrentYear(i32),
    #[error("score evaluated to a non-finite number")]
    NonFinite,
}

/// Scores candidate books against one reader's preferences
#[derive(Debug, Clone, Copy)]
pub struct PersonalizedScorer {
    current_year: i32,
}

impl PersonalizedScorer {
    pub fn new(current_year: i32) -> Self {
        Self { current_year }
    }

    pub fn for_current_year() -> Self {
        Self::new(chrono::Utc::now().year())
    }

    /// Relevance of `book` in `[0, 1]`
    ///
    /// Never fails: a book that cannot be scored gets [`FLOOR_SCORE`].
    /// `_reading_pattern` is accepted for interface stability and is not
    /// part of the formula.
    pub fn score(
        &self,
        book: &Book,
        preferences: &UserPreferences,
        _reading_pattern: Option<&ReadingPattern>,
        genre_weights: &GenreWeights,
    ) -> f64 {
        match self.try_score(book, preferences, genre_weights) {
            Ok(score) => score,
            Err(e) => {
                tracing::warn!(book_id = %book.id, error = %e, "Scoring failed, using floor score");
                FLOOR_SCORE
            }
        }
    }

    pub fn score_all(
        &self,
        books: Vec<Book>,
        preferences: &UserPreferences,
        reading_pattern: Option<&ReadingPattern>,
        genre_weights: &GenreWeights,
    ) -> Vec<ScoredBook> {
        books
            .into_iter()
            .map(|book| {
                let score = self.score(&book, preferences, reading_pattern, genre_weights);
                ScoredBook { book, score }
            })
            .collect()
    }

    fn try_score(
        &self,
        book: &Book,
        preferences: &UserPreferences,
        genre_weights: &GenreWeights,
    ) -> Result<f64, ScoreError> {
        let raw = genre_component(book, preferences, genre_weights)?
            + author_component(book, preferences)
            + reading_level_component(book, preferences)
            + self.recency_component(book)?;

        if !raw.is_finite() {
            return Err(ScoreError::NonFinite);
        }

        if raw == 0.0 {
            return Ok(FLOOR_SCORE);
        }

        Ok(raw.clamp(0.0, 1.0))
    }

    fn recency_component(&self, book: &Book) -> Result<f64, ScoreError> {
        let Some(year) = book.publication_year else {
            return Ok(0.0);
        };

        // f64 throughout: any i32 year is representable and cannot overflow.
        let base = f64::from(RECENCY_BASE_YEAR);
        let span = f64::from(self.current_year) - base;
        if span <= 0.0 {
            return Err(ScoreError::InvalidCurrentYear(self.current_year));
        }

        let recency = ((f64::from(year) - base) / span).clamp(0.0, 1.0);
        Ok(recency * SCORE_WEIGHTS.recency)
    }
}

/// Weighted share of the book's genres that the reader favors
fn genre_component(
    book: &Book,
    preferences: &UserPreferences,
    genre_weights: &GenreWeights,
) -> Result<f64, ScoreError> {
    let mut matched = 0.0;
    for genre in book.genres.iter().filter(|g| preferences.likes_genre(g)) {
        let weight = genre_weights
            .get(genre)
            .copied()
            .unwrap_or(DEFAULT_GENRE_WEIGHT);
        if !weight.is_finite() {
            return Err(ScoreError::InvalidGenreWeight {
                genre: genre.clone(),
            });
        }
        matched += weight;
    }

    let genre_count = book.genres.len().max(1) as f64;
    Ok(matched / genre_count * SCORE_WEIGHTS.genre_match)
}

fn author_component(book: &Book, preferences: &UserPreferences) -> f64 {
    if preferences.likes_author(&book.author) {
        SCORE_WEIGHTS.author_match
    } else {
        0.0
    }
}

fn reading_level_component(book: &Book, preferences: &UserPreferences) -> f64 {
    match &book.reading_level {
        Some(level) if *level == preferences.reading_level => SCORE_WEIGHTS.reading_level,
        _ => 0.0,
    }
}

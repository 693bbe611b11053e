use std::cmp::Ordering;

use crate::models::{Book, CategoryFilter, ScoredBook};

/// Only candidates scoring strictly above this are recommended
///
/// Equal to the scorer's floor, so a book that matched nothing is never shown.
pub const MIN_SCORE: f64 = 0.1;

/// Maximum number of books in one recommendation list
pub const MAX_RECOMMENDATIONS: usize = 10;

/// Turns a scored pool into the final recommendation list
///
/// Applies the optional category filter, drops scores at or below
/// [`MIN_SCORE`], sorts by score descending (ties keep pool order), and keeps
/// the top [`MAX_RECOMMENDATIONS`].
pub fn rank_and_filter(scored: Vec<ScoredBook>, filter: Option<CategoryFilter>) -> Vec<Book> {
    let mut ranked: Vec<ScoredBook> = scored
        .into_iter()
        .filter(|candidate| filter.map_or(true, |f| f.matches(&candidate.book)))
        .filter(|candidate| candidate.score > MIN_SCORE)
        .collect();

    // `sort_by` is stable, which is what keeps ties in pool order.
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranked.truncate(MAX_RECOMMENDATIONS);

    ranked.into_iter().map(|candidate| candidate.book).collect()
}

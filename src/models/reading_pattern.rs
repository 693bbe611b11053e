use serde::{Deserialize, Serialize};

/// Aggregate reading statistics for a user
///
/// Carried through to the scorer alongside the preferences but not part of
/// the score today.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct ReadingPattern {
    pub total_books_read: i32,
    pub avg_reading_hours: f64,
    pub preferred_genre: String,
    pub avg_pages_per_session: f64,
    pub completed_sessions: i32,
    pub abandoned_sessions: i32,
}

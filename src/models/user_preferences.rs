use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reading level assumed when the user has never set one
pub const DEFAULT_READING_LEVEL: &str = "intermediate";

/// Per-user genre affinity multipliers; a genre missing here weighs 1.0
pub type GenreWeights = HashMap<String, f64>;

/// A reader's stated taste
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct UserPreferences {
    #[serde(default)]
    pub favorite_genres: Vec<String>,
    #[serde(default)]
    pub favorite_authors: Vec<String>,
    #[serde(default = "default_reading_level")]
    pub reading_level: String,
}

fn default_reading_level() -> String {
    DEFAULT_READING_LEVEL.to_string()
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            favorite_genres: Vec::new(),
            favorite_authors: Vec::new(),
            reading_level: default_reading_level(),
        }
    }
}

impl UserPreferences {
    pub fn likes_genre(&self, genre: &str) -> bool {
        self.favorite_genres.iter().any(|g| g == genre)
    }

    pub fn likes_author(&self, author: &str) -> bool {
        self.favorite_authors.iter().any(|a| a == author)
    }
}

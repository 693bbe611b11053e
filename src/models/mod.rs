use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod category;
pub mod reading_pattern;
pub mod shelf;
pub mod user_preferences;

pub use category::CategoryFilter;
pub use reading_pattern::ReadingPattern;
pub use shelf::{ReadingStatus, ShelfUpdate, MAX_RATING, MIN_RATING};
pub use user_preferences::{GenreWeights, UserPreferences, DEFAULT_READING_LEVEL};

/// A book record as sourced from the catalog or the book table
///
/// Identity is the opaque `id`; everything else is descriptive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub cover_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub publication_year: Option<i32>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub reading_level: Option<String>,
}

/// A candidate book paired with its relevance score for one request
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredBook {
    pub book: Book,
    pub score: f64,
}

// ============================================================================
// Google Books API Types
// ============================================================================

/// Volume list returned by `GET /volumes`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiVolumeList {
    #[serde(default)]
    pub items: Option<Vec<ApiVolume>>,
    #[serde(default)]
    pub total_items: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiVolume {
    pub id: String,
    pub volume_info: ApiVolumeInfo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiVolumeInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Option<Vec<String>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub image_links: Option<ApiImageLinks>,
    #[serde(default)]
    pub industry_identifiers: Option<Vec<ApiIndustryIdentifier>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiImageLinks {
    #[serde(default)]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiIndustryIdentifier {
    pub identifier: String,
}

/// Maps a Google volume id onto a stable book identifier
///
/// The same volume always yields the same id, so exclude lists built from
/// earlier responses keep matching.
pub fn book_id_for_volume(volume_id: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, volume_id.as_bytes()).to_string()
}

/// Parses the leading four-digit year of dates like "2011", "2011-05" or "2011-05-03"
fn parse_publication_year(published_date: &str) -> Option<i32> {
    published_date.get(..4)?.parse().ok()
}

impl From<ApiVolume> for Book {
    fn from(volume: ApiVolume) -> Self {
        let info = volume.volume_info;

        Book {
            id: book_id_for_volume(&volume.id),
            title: info.title.unwrap_or_default(),
            author: info
                .authors
                .and_then(|authors| authors.into_iter().next())
                .unwrap_or_else(|| "Unknown Author".to_string()),
            cover_url: info
                .image_links
                .and_then(|links| links.thumbnail)
                .unwrap_or_default(),
            description: info.description.unwrap_or_default(),
            isbn: info
                .industry_identifiers
                .and_then(|ids| ids.into_iter().next())
                .map(|id| id.identifier)
                .unwrap_or_default(),
            publication_year: info
                .published_date
                .as_deref()
                .and_then(parse_publication_year),
            genres: info.categories.unwrap_or_default(),
            reading_level: None,
        }
    }
}

use serde::{Deserialize, Serialize};

use super::Book;

/// Genre fragments that mark a book as fiction, matched case-insensitively
const FICTION_MARKERS: [&str; 5] = ["fantasy", "science fiction", "fiction", "romance", "mystery"];

/// Fiction / non-fiction narrowing of a recommendation list
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CategoryFilter {
    Fiction,
    #[serde(rename = "Non-Fiction")]
    NonFiction,
}

impl CategoryFilter {
    pub fn matches(self, book: &Book) -> bool {
        match self {
            CategoryFilter::Fiction => is_fiction(book),
            CategoryFilter::NonFiction => !is_fiction(book),
        }
    }
}

/// A book is fiction when any genre contains one of the fiction markers
pub fn is_fiction(book: &Book) -> bool {
    book.genres.iter().any(|genre| {
        let genre = genre.to_lowercase();
        FICTION_MARKERS.iter().any(|marker| genre.contains(marker))
    })
}

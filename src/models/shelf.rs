use serde::{Deserialize, Serialize};

/// Lowest star rating a reader can give
pub const MIN_RATING: i16 = 1;

/// Highest star rating a reader can give
pub const MAX_RATING: i16 = 5;

/// Where a book sits on a reader's shelf
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReadingStatus {
    WantToRead,
    Read,
}

impl ReadingStatus {
    /// Value stored in `reading_status.status`
    pub fn as_str(self) -> &'static str {
        match self {
            ReadingStatus::WantToRead => "want_to_read",
            ReadingStatus::Read => "read",
        }
    }
}

/// Requested shelf change; `none` takes the book off the shelf
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShelfUpdate {
    WantToRead,
    Read,
    #[serde(rename = "none")]
    Remove,
}

impl ShelfUpdate {
    /// Status to store, `None` when the book should be removed
    pub fn status(self) -> Option<ReadingStatus> {
        match self {
            ShelfUpdate::WantToRead => Some(ReadingStatus::WantToRead),
            ShelfUpdate::Read => Some(ReadingStatus::Read),
            ShelfUpdate::Remove => None,
        }
    }
}

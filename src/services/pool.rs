use std::collections::HashSet;

use crate::models::Book;

/// Merges sourced candidates into one pool
///
/// Similar books come first so they win identifier collisions with genre
/// results. The first occurrence of each id is kept, excluded ids are
/// dropped, and input order is otherwise preserved.
pub fn build_candidate_pool(
    similar: Vec<Book>,
    genre_matched: Vec<Book>,
    exclude_ids: &HashSet<String>,
) -> Vec<Book> {
    let mut seen: HashSet<String> = HashSet::new();

    similar
        .into_iter()
        .chain(genre_matched)
        .filter(|book| !exclude_ids.contains(&book.id))
        .filter(|book| seen.insert(book.id.clone()))
        .collect()
}

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::Book,
    services::providers::CatalogProvider,
};

/// Google Books refuses to page past this offset
pub const MAX_START_INDEX: u32 = 1000;

/// Free-text catalog search backing the search endpoint
///
/// Unlike the recommendation path, failures here reach the caller.
pub async fn search_books(
    catalog: Arc<dyn CatalogProvider>,
    query: &str,
    start_index: u32,
) -> AppResult<Vec<Book>> {
    if query.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Search query cannot be empty".to_string(),
        ));
    }
    if start_index > MAX_START_INDEX {
        return Err(AppError::InvalidInput(format!(
            "start_index must be at most {}",
            MAX_START_INDEX
        )));
    }

    catalog.search_books(query, start_index).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::MockCatalogProvider;

    #[tokio::test]
    async fn test_blank_query_rejected_without_catalog_call() {
        let mut catalog = MockCatalogProvider::new();
        catalog.expect_search_books().never();

        let result = search_books(Arc::new(catalog), "   ", 0).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_start_index_bounded() {
        let mut catalog = MockCatalogProvider::new();
        catalog.expect_search_books().never();

        let result = search_books(Arc::new(catalog), "dune", MAX_START_INDEX + 1).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_delegates_to_catalog() {
        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_search_books()
            .withf(|query, start| query == "dune" && *start == 40)
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let books = search_books(Arc::new(catalog), "dune", 40).await.unwrap();
        assert!(books.is_empty());
    }
}

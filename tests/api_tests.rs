use std::collections::{HashMap, HashSet};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use next_page_api::{
    api::{create_router, AppState},
    error::{AppError, AppResult},
    models::{Book, GenreWeights, ReadingPattern, ReadingStatus, UserPreferences},
    services::{
        providers::CatalogProvider,
        store::{
            ExclusionStore, GenreWeightStore, PreferenceStore, ReadingPatternStore,
            ReaderShelfStore, SimilarityLookup,
        },
        ReaderStores, RecommendationEngine,
    },
};

fn book(id: &str, genres: &[&str], author: &str, year: Option<i32>) -> Book {
    Book {
        id: id.to_string(),
        title: format!("Title {}", id),
        author: author.to_string(),
        cover_url: String::new(),
        description: String::new(),
        isbn: String::new(),
        publication_year: year,
        genres: genres.iter().map(|g| g.to_string()).collect(),
        reading_level: None,
    }
}

/// Catalog that serves a fixed shelf and counts calls
#[derive(Default)]
struct FakeCatalog {
    shelf: Vec<Book>,
    fail: bool,
    calls: AtomicUsize,
}

#[async_trait]
impl CatalogProvider for FakeCatalog {
    async fn search_by_genres(
        &self,
        genres: &[String],
        exclude_ids: &HashSet<String>,
        limit: usize,
    ) -> AppResult<Vec<Book>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::Catalog("catalog unavailable".to_string()));
        }
        Ok(self
            .shelf
            .iter()
            .filter(|b| b.genres.iter().any(|g| genres.contains(g)))
            .filter(|b| !exclude_ids.contains(&b.id))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn search_books(&self, query: &str, _start_index: u32) -> AppResult<Vec<Book>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::Catalog("catalog unavailable".to_string()));
        }
        let query = query.to_lowercase();
        Ok(self
            .shelf
            .iter()
            .filter(|b| b.title.to_lowercase().contains(&query))
            .cloned()
            .collect())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

type ShelfKey = (String, String);

/// Reader-written shelf rows, keyed by (user id, book id)
#[derive(Default)]
struct FakeShelf {
    statuses: HashMap<ShelfKey, (ReadingStatus, Book)>,
    ratings: HashMap<ShelfKey, i16>,
    dismissed: HashSet<ShelfKey>,
    disliked: HashSet<ShelfKey>,
}

/// One in-memory reader database backing every store trait
#[derive(Default)]
struct FakeReaders {
    preferences: HashMap<String, UserPreferences>,
    weights: HashMap<String, GenreWeights>,
    similar: Vec<Book>,
    excluded: HashMap<String, HashSet<String>>,
    shelf: Mutex<FakeShelf>,
    fail: bool,
    calls: AtomicUsize,
}

fn key(user_id: &str, book_id: &str) -> ShelfKey {
    (user_id.to_string(), book_id.to_string())
}

impl FakeReaders {
    fn check(&self) -> AppResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::Internal("database unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for FakeReaders {
    async fn user_preferences(&self, user_id: &str) -> AppResult<Option<UserPreferences>> {
        self.check()?;
        Ok(self.preferences.get(user_id).cloned())
    }
}

#[async_trait]
impl ReadingPatternStore for FakeReaders {
    async fn reading_pattern(&self, _user_id: &str) -> AppResult<Option<ReadingPattern>> {
        self.check()?;
        Ok(None)
    }
}

#[async_trait]
impl GenreWeightStore for FakeReaders {
    async fn genre_weights(&self, user_id: &str) -> AppResult<GenreWeights> {
        self.check()?;
        Ok(self.weights.get(user_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl SimilarityLookup for FakeReaders {
    async fn similar_books(&self, book_ids: &[String]) -> AppResult<Vec<Book>> {
        self.check()?;
        if book_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.similar.clone())
    }
}

#[async_trait]
impl ExclusionStore for FakeReaders {
    async fn excluded_book_ids(&self, user_id: &str) -> AppResult<HashSet<String>> {
        self.check()?;
        let mut ids = self.excluded.get(user_id).cloned().unwrap_or_default();
        let shelf = self.shelf.lock().unwrap();
        let owned = shelf
            .statuses
            .keys()
            .chain(shelf.dismissed.iter())
            .chain(shelf.disliked.iter())
            .filter(|(user, _)| user == user_id)
            .map(|(_, book)| book.clone());
        ids.extend(owned);
        Ok(ids)
    }
}

#[async_trait]
impl ReaderShelfStore for FakeReaders {
    async fn set_reading_status(
        &self,
        user_id: &str,
        book: &Book,
        status: ReadingStatus,
    ) -> AppResult<String> {
        self.check()?;
        let mut shelf = self.shelf.lock().unwrap();
        shelf
            .statuses
            .insert(key(user_id, &book.id), (status, book.clone()));
        Ok(book.id.clone())
    }

    async fn remove_book(&self, user_id: &str, book_id: &str) -> AppResult<()> {
        self.check()?;
        let mut shelf = self.shelf.lock().unwrap();
        shelf.statuses.remove(&key(user_id, book_id));
        shelf.ratings.remove(&key(user_id, book_id));
        Ok(())
    }

    async fn shelf_books(&self, user_id: &str, status: ReadingStatus) -> AppResult<Vec<Book>> {
        self.check()?;
        let shelf = self.shelf.lock().unwrap();
        Ok(shelf
            .statuses
            .iter()
            .filter(|((user, _), (s, _))| user == user_id && *s == status)
            .map(|(_, (_, book))| book.clone())
            .collect())
    }

    async fn rate_book(&self, user_id: &str, book_id: &str, rating: i16) -> AppResult<()> {
        self.check()?;
        let mut shelf = self.shelf.lock().unwrap();
        shelf.ratings.insert(key(user_id, book_id), rating);
        Ok(())
    }

    async fn book_rating(&self, user_id: &str, book_id: &str) -> AppResult<Option<i16>> {
        self.check()?;
        let shelf = self.shelf.lock().unwrap();
        Ok(shelf.ratings.get(&key(user_id, book_id)).copied())
    }

    async fn dismiss_recommendation(&self, user_id: &str, book: &Book) -> AppResult<String> {
        self.check()?;
        let mut shelf = self.shelf.lock().unwrap();
        shelf.dismissed.insert(key(user_id, &book.id));
        Ok(book.id.clone())
    }

    async fn add_negative_feedback(&self, user_id: &str, book: &Book) -> AppResult<String> {
        self.check()?;
        let mut shelf = self.shelf.lock().unwrap();
        shelf.disliked.insert(key(user_id, &book.id));
        Ok(book.id.clone())
    }
}

fn create_test_server(catalog: Arc<FakeCatalog>, readers: Arc<FakeReaders>) -> TestServer {
    let engine = RecommendationEngine::new(
        catalog.clone(),
        ReaderStores {
            preferences: readers.clone(),
            reading_patterns: readers.clone(),
            genre_weights: readers.clone(),
            similar_books: readers.clone(),
        },
    );
    let state = AppState::new(engine, catalog, readers.clone(), readers);
    TestServer::new(create_router(state)).unwrap()
}

fn fantasy_shelf() -> Vec<Book> {
    let mut shelf = vec![
        book("wizard", &["Fantasy"], "Ursula K. Le Guin", Some(1968)),
        book("mistborn", &["Fantasy", "Adventure"], "Brandon Sanderson", Some(2006)),
        book("dune", &["Science Fiction"], "Frank Herbert", Some(1965)),
        book("sapiens", &["History"], "Yuval Noah Harari", Some(2011)),
        book("gideon", &["Fantasy", "Science Fiction"], "Tamsyn Muir", Some(2019)),
    ];
    for i in 0..15 {
        shelf.push(book(
            &format!("filler-{}", i),
            &["Fantasy"],
            "Various",
            Some(2000 + i),
        ));
    }
    shelf
}

fn fantasy_reader() -> FakeReaders {
    let mut readers = FakeReaders::default();
    readers.preferences.insert(
        "reader-1".to_string(),
        UserPreferences {
            favorite_genres: vec!["Fantasy".to_string()],
            favorite_authors: vec!["Ursula K. Le Guin".to_string()],
            reading_level: "intermediate".to_string(),
        },
    );
    readers.weights.insert(
        "reader-1".to_string(),
        [("Fantasy".to_string(), 2.0)].into_iter().collect(),
    );
    readers
}

fn ids(books: &[Value]) -> Vec<&str> {
    books.iter().map(|b| b["id"].as_str().unwrap()).collect()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(Arc::default(), Arc::default());
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_anonymous_empty_request_calls_nothing() {
    let catalog = Arc::new(FakeCatalog {
        shelf: fantasy_shelf(),
        ..Default::default()
    });
    let readers = Arc::new(FakeReaders::default());
    let server = create_test_server(catalog.clone(), readers.clone());

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "recent_books": [], "exclude_ids": [] }))
        .await;

    response.assert_status_ok();
    let books: Vec<Value> = response.json();
    assert!(books.is_empty());
    assert_eq!(catalog.calls.load(Ordering::SeqCst), 0);
    assert_eq!(readers.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_signed_in_reader_gets_ranked_capped_unique_list() {
    let catalog = Arc::new(FakeCatalog {
        shelf: fantasy_shelf(),
        ..Default::default()
    });
    let mut readers = fantasy_reader();
    readers.similar = vec![book("wizard", &["Fantasy"], "Ursula K. Le Guin", Some(1968))];
    let server = create_test_server(catalog, Arc::new(readers));

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({
            "user_id": "reader-1",
            "recent_books": [
                { "id": "seed", "title": "The Tombs of Atuan", "author": "Ursula K. Le Guin", "genres": ["Fantasy"] }
            ],
            "exclude_ids": []
        }))
        .await;

    response.assert_status_ok();
    let books: Vec<Value> = response.json();
    assert_eq!(books.len(), 10);

    let returned = ids(&books);
    let unique: HashSet<&str> = returned.iter().copied().collect();
    assert_eq!(unique.len(), returned.len());

    // Favorite author plus a fully favored genre clamps to 1.0.
    assert_eq!(returned[0], "wizard");
    assert!(!returned.contains(&"sapiens"));
}

#[tokio::test]
async fn test_request_and_stored_exclusions_both_apply() {
    let catalog = Arc::new(FakeCatalog {
        shelf: fantasy_shelf(),
        ..Default::default()
    });
    let mut readers = fantasy_reader();
    readers.excluded.insert(
        "reader-1".to_string(),
        ["wizard".to_string()].into_iter().collect(),
    );
    let server = create_test_server(catalog, Arc::new(readers));

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({
            "user_id": "reader-1",
            "recent_books": [],
            "exclude_ids": ["mistborn"]
        }))
        .await;

    response.assert_status_ok();
    let books: Vec<Value> = response.json();
    let returned = ids(&books);
    assert!(!returned.is_empty());
    assert!(!returned.contains(&"wizard"));
    assert!(!returned.contains(&"mistborn"));
}

#[tokio::test]
async fn test_fiction_filter_over_http() {
    let catalog = Arc::new(FakeCatalog {
        shelf: vec![
            book("sapiens", &["History"], "Yuval Noah Harari", Some(2011)),
            book("dune", &["Science Fiction"], "Frank Herbert", Some(1965)),
        ],
        ..Default::default()
    });
    let mut readers = FakeReaders::default();
    readers.preferences.insert(
        "reader-2".to_string(),
        UserPreferences {
            favorite_genres: vec!["History".to_string(), "Science Fiction".to_string()],
            ..Default::default()
        },
    );
    let readers = Arc::new(readers);
    let server = create_test_server(catalog, readers);

    for (filter, expected) in [("Fiction", "dune"), ("Non-Fiction", "sapiens")] {
        let response = server
            .post("/api/v1/recommendations")
            .json(&json!({
                "user_id": "reader-2",
                "recent_books": [],
                "exclude_ids": [],
                "filter": filter
            }))
            .await;

        response.assert_status_ok();
        let books: Vec<Value> = response.json();
        assert_eq!(ids(&books), vec![expected], "filter {}", filter);
    }
}

#[tokio::test]
async fn test_failing_collaborators_still_answer_ok() {
    let catalog = Arc::new(FakeCatalog {
        shelf: fantasy_shelf(),
        fail: true,
        ..Default::default()
    });
    let readers = Arc::new(FakeReaders {
        fail: true,
        ..fantasy_reader()
    });
    let server = create_test_server(catalog, readers);

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({
            "user_id": "reader-1",
            "recent_books": [
                { "id": "seed", "title": "Elantris", "author": "Brandon Sanderson", "genres": ["Fantasy"] }
            ],
            "exclude_ids": []
        }))
        .await;

    response.assert_status_ok();
    let books: Vec<Value> = response.json();
    assert!(books.is_empty());
}

#[tokio::test]
async fn test_search_books() {
    let catalog = Arc::new(FakeCatalog {
        shelf: fantasy_shelf(),
        ..Default::default()
    });
    let server = create_test_server(catalog, Arc::default());

    let response = server
        .get("/api/v1/books/search")
        .add_query_param("q", "title dune")
        .await;

    response.assert_status_ok();
    let books: Vec<Value> = response.json();
    assert_eq!(ids(&books), vec!["dune"]);
}

#[tokio::test]
async fn test_search_books_rejects_blank_query() {
    let server = create_test_server(Arc::default(), Arc::default());

    let response = server
        .get("/api/v1/books/search")
        .add_query_param("q", "  ")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Search query cannot be empty");
}

#[tokio::test]
async fn test_search_books_catalog_failure_is_bad_gateway() {
    let catalog = Arc::new(FakeCatalog {
        fail: true,
        ..Default::default()
    });
    let server = create_test_server(catalog, Arc::default());

    let response = server
        .get("/api/v1/books/search")
        .add_query_param("q", "dune")
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
}

fn book_json(id: &str, genres: &[&str]) -> Value {
    json!({ "id": id, "title": format!("Title {}", id), "author": "Various", "genres": genres })
}

async fn recommended_ids(server: &TestServer, user_id: &str) -> Vec<String> {
    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "user_id": user_id, "recent_books": [], "exclude_ids": [] }))
        .await;
    response.assert_status_ok();
    let books: Vec<Value> = response.json();
    books
        .iter()
        .map(|b| b["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_shelf_dismissal_and_feedback_feed_exclusions() {
    let catalog = Arc::new(FakeCatalog {
        shelf: fantasy_shelf(),
        ..Default::default()
    });
    let server = create_test_server(catalog, Arc::new(fantasy_reader()));

    let before = recommended_ids(&server, "reader-1").await;
    assert_eq!(before[0], "wizard");

    server
        .post("/api/v1/users/reader-1/dismissals")
        .json(&book_json("wizard", &["Fantasy"]))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .post("/api/v1/users/reader-1/feedback/negative")
        .json(&book_json("filler-14", &["Fantasy"]))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .put("/api/v1/users/reader-1/books")
        .json(&json!({ "book": book_json("filler-13", &["Fantasy"]), "status": "want_to_read" }))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let after = recommended_ids(&server, "reader-1").await;
    assert!(!after.is_empty());
    for gone in ["wizard", "filler-14", "filler-13"] {
        assert!(!after.iter().any(|id| id == gone), "{} still recommended", gone);
    }
}

#[tokio::test]
async fn test_reading_status_lists_and_removal() {
    let server = create_test_server(Arc::default(), Arc::default());

    for (id, status) in [("a", "want_to_read"), ("b", "read"), ("c", "read")] {
        server
            .put("/api/v1/users/reader-1/books")
            .json(&json!({ "book": book_json(id, &["History"]), "status": status }))
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }
    // Moving a book replaces its earlier status.
    server
        .put("/api/v1/users/reader-1/books")
        .json(&json!({ "book": book_json("a", &["History"]), "status": "read" }))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let reading_list = server
        .get("/api/v1/users/reader-1/books")
        .add_query_param("status", "want_to_read")
        .await;
    reading_list.assert_status_ok();
    let books: Vec<Value> = reading_list.json();
    assert!(books.is_empty());

    let history = server
        .get("/api/v1/users/reader-1/books")
        .add_query_param("status", "read")
        .await;
    let books: Vec<Value> = history.json();
    let mut returned = ids(&books);
    returned.sort();
    assert_eq!(returned, vec!["a", "b", "c"]);

    // "none" takes the book off the shelf.
    server
        .put("/api/v1/users/reader-1/books")
        .json(&json!({ "book": book_json("b", &["History"]), "status": "none" }))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .delete("/api/v1/users/reader-1/books/c")
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let history = server
        .get("/api/v1/users/reader-1/books")
        .add_query_param("status", "read")
        .await;
    let books: Vec<Value> = history.json();
    assert_eq!(ids(&books), vec!["a"]);
}

#[tokio::test]
async fn test_rating_upsert_and_bounds() {
    let server = create_test_server(Arc::default(), Arc::default());

    let missing = server.get("/api/v1/users/reader-1/books/b1/rating").await;
    missing.assert_status_ok();
    let body: Value = missing.json();
    assert_eq!(body["book_id"], "b1");
    assert!(body["rating"].is_null());

    for rating in [2, 4] {
        server
            .put("/api/v1/users/reader-1/books/b1/rating")
            .json(&json!({ "rating": rating }))
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }
    let body: Value = server
        .get("/api/v1/users/reader-1/books/b1/rating")
        .await
        .json();
    assert_eq!(body["rating"], 4);

    server
        .put("/api/v1/users/reader-1/books/b1/rating")
        .json(&json!({ "rating": 6 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    // Removing the book forgets its rating.
    server
        .delete("/api/v1/users/reader-1/books/b1")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let body: Value = server
        .get("/api/v1/users/reader-1/books/b1/rating")
        .await
        .json();
    assert!(body["rating"].is_null());
}

#[tokio::test]
async fn test_shelf_store_failure_is_server_error() {
    let readers = Arc::new(FakeReaders {
        fail: true,
        ..Default::default()
    });
    let server = create_test_server(Arc::default(), readers);

    let response = server
        .post("/api/v1/users/reader-1/dismissals")
        .json(&book_json("wizard", &["Fantasy"]))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_malformed_recommendation_body_is_client_error() {
    let server = create_test_server(Arc::default(), Arc::default());

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "recent_books": "not a list" }))
        .await;

    assert!(response.status_code().is_client_error());
}

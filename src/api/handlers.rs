use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    models::{Book, CategoryFilter, ReadingStatus, ShelfUpdate},
    services::{book_search, shelf, RecommendationQuery},
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default)]
    pub start_index: u32,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub recent_books: Vec<Book>,
    #[serde(default)]
    pub exclude_ids: Vec<String>,
    #[serde(default)]
    pub filter: Option<CategoryFilter>,
}

#[derive(Debug, Deserialize)]
pub struct ShelfParams {
    pub status: ReadingStatus,
}

#[derive(Debug, Deserialize)]
pub struct ReadingStatusRequest {
    pub book: Book,
    pub status: ShelfUpdate,
}

#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub rating: i16,
}

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub book_id: String,
    pub rating: Option<i16>,
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Free-text catalog search
pub async fn search_books(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<Book>>> {
    let books = book_search::search_books(state.catalog, &params.q, params.start_index).await?;
    Ok(Json(books))
}

/// Personalized recommendations
///
/// Any well-formed request is answered with 200: a reader we know nothing
/// about, or a failing collaborator, yields an empty list rather than an
/// error. A body that fails to deserialize is rejected by the extractor.
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> Json<Vec<Book>> {
    let user_id = request
        .user_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());

    let mut exclude: HashSet<String> = request.exclude_ids.into_iter().collect();
    if let Some(user_id) = user_id.as_deref() {
        match state.exclusions.excluded_book_ids(user_id).await {
            Ok(stored) => exclude.extend(stored),
            Err(e) => tracing::warn!(
                user_id,
                error = %e,
                "Exclusion lookup failed, using request exclusions only"
            ),
        }
    }

    let query = RecommendationQuery {
        user_id,
        recent_books: request.recent_books,
        exclude_ids: exclude.into_iter().collect(),
        filter: request.filter,
    };

    Json(state.engine.get_recommendations(query).await)
}

/// Reading list or reading history
/// GET /users/{user_id}/books?status=want_to_read|read
pub async fn shelf_books(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<ShelfParams>,
) -> AppResult<Json<Vec<Book>>> {
    let books = shelf::shelf_books(state.shelf.as_ref(), &user_id, params.status).await?;
    Ok(Json(books))
}

/// PUT /users/{user_id}/books
pub async fn update_reading_status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<ReadingStatusRequest>,
) -> AppResult<StatusCode> {
    shelf::update_reading_status(state.shelf.as_ref(), &user_id, &request.book, request.status)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /users/{user_id}/books/{book_id}
pub async fn remove_book(
    State(state): State<AppState>,
    Path((user_id, book_id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    shelf::remove_book(state.shelf.as_ref(), &user_id, &book_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/{user_id}/books/{book_id}/rating
pub async fn book_rating(
    State(state): State<AppState>,
    Path((user_id, book_id)): Path<(String, String)>,
) -> AppResult<Json<RatingResponse>> {
    let rating = shelf::book_rating(state.shelf.as_ref(), &user_id, &book_id).await?;
    Ok(Json(RatingResponse { book_id, rating }))
}

/// PUT /users/{user_id}/books/{book_id}/rating
pub async fn rate_book(
    State(state): State<AppState>,
    Path((user_id, book_id)): Path<(String, String)>,
    Json(request): Json<RatingRequest>,
) -> AppResult<StatusCode> {
    shelf::rate_book(state.shelf.as_ref(), &user_id, &book_id, request.rating).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /users/{user_id}/dismissals
pub async fn dismiss_recommendation(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(book): Json<Book>,
) -> AppResult<StatusCode> {
    shelf::dismiss_recommendation(state.shelf.as_ref(), &user_id, &book).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /users/{user_id}/feedback/negative
pub async fn add_negative_feedback(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(book): Json<Book>,
) -> AppResult<StatusCode> {
    shelf::add_negative_feedback(state.shelf.as_ref(), &user_id, &book).await?;
    Ok(StatusCode::NO_CONTENT)
}

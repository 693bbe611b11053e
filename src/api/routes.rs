use axum::{
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/books/search", get(handlers::search_books))
        .route("/recommendations", post(handlers::recommend))
        // Reader shelf
        .route(
            "/users/:user_id/books",
            get(handlers::shelf_books).put(handlers::update_reading_status),
        )
        .route("/users/:user_id/books/:book_id", delete(handlers::remove_book))
        .route(
            "/users/:user_id/books/:book_id/rating",
            get(handlers::book_rating).put(handlers::rate_book),
        )
        .route("/users/:user_id/dismissals", post(handlers::dismiss_recommendation))
        .route("/users/:user_id/feedback/negative", post(handlers::add_negative_feedback))
}

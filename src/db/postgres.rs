use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};

const MAX_CONNECTIONS: u32 = 5;

/// Creates the PostgreSQL pool backing the reader stores
///
/// Lookups against this pool sit on the recommendation path, so acquiring a
/// connection is bounded rather than left to queue indefinitely.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await?;

    tracing::info!(max_connections = MAX_CONNECTIONS, "PostgreSQL pool ready");

    Ok(pool)
}

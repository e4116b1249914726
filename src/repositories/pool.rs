use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::models::RepositoryResult;

/// Open a SQLite connection pool for the configured database.
///
/// An in-memory database lives only as long as its connection, so memory URLs
/// get a single connection that is never recycled.
pub async fn create_pool(config: &DatabaseConfig) -> RepositoryResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = if config.is_in_memory() {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?
    };

    info!(
        database_url = %config.database_url,
        "SQLite connection pool created"
    );
    Ok(pool)
}

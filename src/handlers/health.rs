use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tracing::{instrument, warn};

/// Health check: reports the service and whether the database answers
#[instrument(name = "health_check", skip(pool))]
pub async fn health_check(State(pool): State<SqlitePool>) -> (StatusCode, Json<Value>) {
    let database_ok = match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&pool).await {
        Ok(_) => true,
        Err(e) => {
            warn!(error = %e, "Database health probe failed");
            false
        }
    };

    let status = if database_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if database_ok { "healthy" } else { "degraded" },
            "service": "cafeteria-rs",
            "version": env!("CARGO_PKG_VERSION"),
            "database": if database_ok { "up" } else { "down" },
            "timestamp": chrono::Utc::now().to_rfc3339()
        })),
    )
}

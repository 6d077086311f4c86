use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::AppState;

/// GET /health — probes both backends the feeds depend on.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let db_ok = sqlx::query("SELECT 1").execute(&state.db).await;
    let redis_ok = match state.redis_client.get_multiplexed_async_connection().await {
        Ok(mut conn) => {
            let pong: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
            pong.map(|_| ())
        }
        Err(e) => Err(e),
    };

    match (&db_ok, &redis_ok) {
        (Ok(_), Ok(_)) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "db": "connected", "redis": "connected" })),
        ),
        _ => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "error",
                "db": db_ok.err().map(|e| e.to_string()).unwrap_or_else(|| "connected".into()),
                "redis": redis_ok.err().map(|e| e.to_string()).unwrap_or_else(|| "connected".into()),
            })),
        ),
    }
}

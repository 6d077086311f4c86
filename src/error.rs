use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Failure taxonomy shared by the announcement feed and the settings store.
///
/// Adapters never recover on their own: every variant propagates to the
/// caller, and mutations are single-attempt (safe to re-issue — writes are
/// idempotent by id or whole-document overwrites).
#[derive(Debug, Error)]
pub enum StoreError {
    /// A field failed its bound. Locally correctable by the caller.
    #[error("{field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// The session does not carry the operator claim.
    #[error("operator privileges required")]
    Permission,

    /// The id no longer exists — the caller should refresh its feed.
    #[error("no record with id {0}")]
    NotFound(Uuid),

    /// Transport or infrastructure failure talking to the store.
    #[error("store unavailable: {0}")]
    Unavailable(anyhow::Error),
}

impl StoreError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        StoreError::Validation {
            field,
            reason: reason.into(),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Unavailable(e.into())
    }
}

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        StoreError::Unavailable(e.into())
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            StoreError::Validation { field, reason } => (
                StatusCode::BAD_REQUEST,
                format!("{field}: {reason}"),
            ),
            StoreError::Permission => (
                StatusCode::FORBIDDEN,
                "operator privileges required".to_string(),
            ),
            StoreError::NotFound(id) => {
                (StatusCode::NOT_FOUND, format!("no record with id {id}"))
            }
            StoreError::Unavailable(e) => {
                tracing::error!("store unavailable: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "store unavailable".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_names_the_field() {
        let e = StoreError::validation("title", "must be at most 100 characters");
        assert_eq!(e.to_string(), "title: must be at most 100 characters");
    }
}

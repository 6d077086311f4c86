use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    models::auth::{LoginRequest, LoginResponse, Session},
    services::{auth::AuthService, metrics},
    AppState,
};

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<Value>)> {
    match AuthService::login(
        &state.db,
        &body.email,
        &body.password,
        &state.config.jwt_secret,
        state.config.jwt_expiry_seconds,
    )
    .await
    {
        Ok(response) => {
            metrics::LOGINS_COUNTER.with_label_values(&["success"]).inc();
            Ok(Json(response))
        }
        Err(e) => {
            metrics::LOGINS_COUNTER.with_label_values(&["failure"]).inc();
            Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": e.to_string() })),
            ))
        }
    }
}

/// GET /auth/me
pub async fn me(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let id = session
        .principal
        .as_deref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid session principal" })),
        ))?;

    match AuthService::fetch_profile(&state.db, id).await {
        Ok(Some(profile)) => Ok(Json(json!({ "user": profile }))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Account no longer exists" })),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )),
    }
}

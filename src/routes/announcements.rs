use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::StoreError,
    models::{
        announcement::{CreateAnnouncementRequest, SetStatusRequest, UpdateAnnouncementRequest},
        auth::Session,
    },
    AppState,
};

/// GET /announcements — the latest projected snapshot, newest first.
pub async fn list_announcements(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Value>, StoreError> {
    session.require_operator()?;
    let snapshot = state.announcements.latest()?;
    Ok(Json(json!({ "announcements": &*snapshot })))
}

/// POST /announcements
pub async fn create_announcement(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<CreateAnnouncementRequest>,
) -> Result<(StatusCode, Json<Value>), StoreError> {
    let id = state.announcements.create(&session, body).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// PUT /announcements/{id}
pub async fn update_announcement(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateAnnouncementRequest>,
) -> Result<Json<Value>, StoreError> {
    state.announcements.update(&session, id, body).await?;
    Ok(Json(json!({ "ok": true })))
}

/// DELETE /announcements/{id} — permanent removal.
pub async fn delete_announcement(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, StoreError> {
    state.announcements.delete(&session, id).await?;
    Ok(Json(json!({ "ok": true })))
}

/// PUT /announcements/{id}/status — operator override of the derived status.
pub async fn set_announcement_status(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(body): Json<SetStatusRequest>,
) -> Result<Json<Value>, StoreError> {
    state
        .announcements
        .set_status(&session, id, body.status)
        .await?;
    Ok(Json(json!({ "ok": true })))
}

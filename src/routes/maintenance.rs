use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{
    error::StoreError,
    models::{auth::Session, maintenance::ReplaceMaintenanceRequest},
    AppState,
};

/// GET /maintenance — any authenticated console user. Delivers the stored
/// settings, or the synthesized disabled default before the first write.
pub async fn get_maintenance(
    State(state): State<AppState>,
    _session: Session,
) -> Result<Json<Value>, StoreError> {
    let settings = state.maintenance.latest()?;
    Ok(Json(json!({ "maintenance": &*settings })))
}

/// PUT /maintenance — operator only; whole-document replace.
pub async fn replace_maintenance(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<ReplaceMaintenanceRequest>,
) -> Result<Json<Value>, StoreError> {
    state.maintenance.replace(&session, body).await?;
    let settings = state.maintenance.latest()?;
    Ok(Json(json!({ "maintenance": &*settings })))
}

use axum::{extract::State, Json};

use crate::{
    error::StoreError,
    models::auth::Session,
    services::stats::{self, DashboardStats},
    AppState,
};

/// GET /stats — dashboard counters, computed from the live snapshots.
pub async fn dashboard_stats(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<DashboardStats>, StoreError> {
    session.require_operator()?;
    let announcements = state.announcements.latest()?;
    let maintenance = state.maintenance.latest()?;
    Ok(Json(stats::compute(&announcements, &maintenance)))
}

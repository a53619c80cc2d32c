//! Dashboard endpoint handler

use axum::extract::State;

use crate::api::middleware::CurrentUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::aggregation::DashboardStats;

/// GET /v1/dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<DashboardStats>, ApiError> {
    Ok(Json(state.dashboard.get(user.id()).await?))
}

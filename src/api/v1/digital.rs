//! Digital location, subscription and payment handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use tracing::debug;

use crate::api::middleware::CurrentUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::aggregation::DigitalBffResponse;
use crate::domain::{DigitalLocation, Payment};
use crate::infrastructure::services::{
    CreateDigitalLocationRequest, RecordPaymentRequest, SubscriptionRequest,
    UpdateDigitalLocationRequest,
};

use super::DeletedResponse;

/// GET /v1/digital-locations
pub async fn list_locations(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<DigitalLocation>>, ApiError> {
    Ok(Json(state.digital_locations.list(user.id()).await?))
}

/// GET /v1/digital-locations/bff
pub async fn get_bff(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<DigitalBffResponse>, ApiError> {
    Ok(Json(state.digital_locations.bff(user.id()).await?))
}

/// GET /v1/digital-locations/{id}
pub async fn get_location(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<DigitalLocation>, ApiError> {
    Ok(Json(state.digital_locations.get(user.id(), &id).await?))
}

/// POST /v1/digital-locations
pub async fn create_location(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateDigitalLocationRequest>,
) -> Result<(StatusCode, Json<DigitalLocation>), ApiError> {
    let location = state.digital_locations.create(user.id(), request).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

/// PUT /v1/digital-locations/{id}
pub async fn update_location(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateDigitalLocationRequest>,
) -> Result<Json<DigitalLocation>, ApiError> {
    Ok(Json(
        state.digital_locations.update(user.id(), &id, request).await?,
    ))
}

/// DELETE /v1/digital-locations/{id}
pub async fn delete_location(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    if !state.digital_locations.delete(user.id(), &id).await? {
        return Err(ApiError::not_found(format!("Digital location '{}' not found", id)));
    }

    Ok(Json(DeletedResponse::new(id)))
}

/// PUT /v1/digital-locations/{id}/subscription
pub async fn upsert_subscription(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<SubscriptionRequest>,
) -> Result<Json<DigitalLocation>, ApiError> {
    debug!(user_id = %user.id(), location_id = %id, cycle = %request.billing_cycle, "Saving subscription");

    Ok(Json(
        state
            .digital_locations
            .upsert_subscription(user.id(), &id, request)
            .await?,
    ))
}

/// DELETE /v1/digital-locations/{id}/subscription
pub async fn remove_subscription(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    if !state.digital_locations.remove_subscription(user.id(), &id).await? {
        return Err(ApiError::not_found(format!(
            "Digital location '{}' has no subscription",
            id
        )));
    }

    Ok(Json(DeletedResponse::new(id)))
}

/// POST /v1/digital-locations/{id}/payments
pub async fn record_payment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<Payment>), ApiError> {
    let payment = state
        .digital_locations
        .record_payment(user.id(), &id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(payment)))
}

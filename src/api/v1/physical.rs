//! Physical location and sublocation handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use crate::api::middleware::CurrentUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::aggregation::PhysicalBffResponse;
use crate::domain::{PhysicalLocation, Sublocation};
use crate::infrastructure::services::{
    CreatePhysicalLocationRequest, CreateSublocationRequest, UpdatePhysicalLocationRequest,
    UpdateSublocationRequest,
};

use super::DeletedResponse;

/// GET /v1/physical-locations
pub async fn list_locations(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<PhysicalLocation>>, ApiError> {
    Ok(Json(state.physical_locations.list(user.id()).await?))
}

/// GET /v1/physical-locations/bff
pub async fn get_bff(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<PhysicalBffResponse>, ApiError> {
    Ok(Json(state.physical_locations.bff(user.id()).await?))
}

/// GET /v1/physical-locations/{id}
pub async fn get_location(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<PhysicalLocation>, ApiError> {
    Ok(Json(state.physical_locations.get(user.id(), &id).await?))
}

/// POST /v1/physical-locations
pub async fn create_location(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreatePhysicalLocationRequest>,
) -> Result<(StatusCode, Json<PhysicalLocation>), ApiError> {
    let location = state.physical_locations.create(user.id(), request).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

/// PUT /v1/physical-locations/{id}
pub async fn update_location(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UpdatePhysicalLocationRequest>,
) -> Result<Json<PhysicalLocation>, ApiError> {
    Ok(Json(
        state.physical_locations.update(user.id(), &id, request).await?,
    ))
}

/// DELETE /v1/physical-locations/{id}
pub async fn delete_location(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    if !state.physical_locations.delete(user.id(), &id).await? {
        return Err(ApiError::not_found(format!("Physical location '{}' not found", id)));
    }

    Ok(Json(DeletedResponse::new(id)))
}

/// GET /v1/sublocations
pub async fn list_sublocations(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Sublocation>>, ApiError> {
    Ok(Json(state.sublocations.list(user.id()).await?))
}

/// GET /v1/sublocations/{id}
pub async fn get_sublocation(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Sublocation>, ApiError> {
    Ok(Json(state.sublocations.get(user.id(), &id).await?))
}

/// POST /v1/sublocations
pub async fn create_sublocation(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateSublocationRequest>,
) -> Result<(StatusCode, Json<Sublocation>), ApiError> {
    let sublocation = state.sublocations.create(user.id(), request).await?;
    Ok((StatusCode::CREATED, Json(sublocation)))
}

/// PUT /v1/sublocations/{id}
pub async fn update_sublocation(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateSublocationRequest>,
) -> Result<Json<Sublocation>, ApiError> {
    Ok(Json(state.sublocations.update(user.id(), &id, request).await?))
}

/// DELETE /v1/sublocations/{id}
pub async fn delete_sublocation(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    if !state.sublocations.delete(user.id(), &id).await? {
        return Err(ApiError::not_found(format!("Sublocation '{}' not found", id)));
    }

    Ok(Json(DeletedResponse::new(id)))
}

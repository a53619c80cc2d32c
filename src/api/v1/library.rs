//! Library endpoint handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use tracing::debug;

use crate::api::middleware::CurrentUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::aggregation::LibraryBffResponse;
use crate::domain::LibraryItem;
use crate::infrastructure::services::{CreateLibraryItemRequest, UpdateLibraryItemRequest};

use super::DeletedResponse;

/// GET /v1/library
pub async fn list_items(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<LibraryItem>>, ApiError> {
    debug!(user_id = %user.id(), "Listing library");

    let items = state.library.list(user.id()).await?;
    Ok(Json(items))
}

/// GET /v1/library/bff
pub async fn get_bff(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<LibraryBffResponse>, ApiError> {
    let response = state.library.bff(user.id()).await?;
    Ok(Json(response))
}

/// GET /v1/library/{game_id}
pub async fn get_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(game_id): Path<i64>,
) -> Result<Json<LibraryItem>, ApiError> {
    let item = state.library.get(user.id(), game_id).await?;
    Ok(Json(item))
}

/// POST /v1/library
pub async fn create_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateLibraryItemRequest>,
) -> Result<(StatusCode, Json<LibraryItem>), ApiError> {
    debug!(user_id = %user.id(), game_id = request.game_id, "Adding game to library");

    let item = state.library.create(user.id(), request).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /v1/library/{game_id}
pub async fn update_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(game_id): Path<i64>,
    Json(request): Json<UpdateLibraryItemRequest>,
) -> Result<Json<LibraryItem>, ApiError> {
    let item = state.library.update(user.id(), game_id, request).await?;
    Ok(Json(item))
}

/// DELETE /v1/library/{game_id}
pub async fn delete_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(game_id): Path<i64>,
) -> Result<Json<DeletedResponse>, ApiError> {
    if !state.library.delete(user.id(), game_id).await? {
        return Err(ApiError::not_found(format!(
            "Game {} is not in the library",
            game_id
        )));
    }

    Ok(Json(DeletedResponse::new(game_id.to_string())))
}

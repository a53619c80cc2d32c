//! v1 API endpoints

pub mod dashboard;
pub mod digital;
pub mod library;
pub mod physical;

use axum::{
    routing::{get, post, put},
    Router,
};
use serde::Serialize;

use super::state::AppState;

/// Body returned by every successful delete
#[derive(Debug, Clone, Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
    pub id: String,
}

impl DeletedResponse {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            deleted: true,
            id: id.into(),
        }
    }
}

pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route(
            "/library",
            get(library::list_items).post(library::create_item),
        )
        .route("/library/bff", get(library::get_bff))
        .route(
            "/library/{game_id}",
            get(library::get_item)
                .put(library::update_item)
                .delete(library::delete_item),
        )
        .route(
            "/physical-locations",
            get(physical::list_locations).post(physical::create_location),
        )
        .route("/physical-locations/bff", get(physical::get_bff))
        .route(
            "/physical-locations/{id}",
            get(physical::get_location)
                .put(physical::update_location)
                .delete(physical::delete_location),
        )
        .route(
            "/sublocations",
            get(physical::list_sublocations).post(physical::create_sublocation),
        )
        .route(
            "/sublocations/{id}",
            get(physical::get_sublocation)
                .put(physical::update_sublocation)
                .delete(physical::delete_sublocation),
        )
        .route(
            "/digital-locations",
            get(digital::list_locations).post(digital::create_location),
        )
        .route("/digital-locations/bff", get(digital::get_bff))
        .route(
            "/digital-locations/{id}",
            get(digital::get_location)
                .put(digital::update_location)
                .delete(digital::delete_location),
        )
        .route(
            "/digital-locations/{id}/subscription",
            put(digital::upsert_subscription).delete(digital::remove_subscription),
        )
        .route(
            "/digital-locations/{id}/payments",
            post(digital::record_payment),
        )
        .route("/dashboard", get(dashboard::get_dashboard))
}

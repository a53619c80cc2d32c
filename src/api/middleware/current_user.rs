//! Caller identity extractor
//!
//! Authentication happens upstream; the proxy in front of this service
//! forwards the authenticated user id in `X-User-Id`.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use crate::api::types::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Id of the user every repository and cache call is scoped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

impl CurrentUser {
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_user_id(&parts.headers).map(CurrentUser)
    }
}

pub fn extract_user_id(headers: &HeaderMap) -> Result<String, ApiError> {
    let value = headers.get(USER_ID_HEADER).ok_or_else(|| {
        ApiError::unauthorized("Missing user identity. Provide the 'X-User-Id' header")
    })?;

    let user_id = value
        .to_str()
        .map_err(|_| ApiError::bad_request("Invalid X-User-Id header encoding"))?
        .trim();

    if user_id.is_empty() {
        return Err(ApiError::bad_request("X-User-Id header cannot be empty"));
    }

    Ok(user_id.to_string())
}

//! Game collection tracker
//!
//! Records which games a user owns and where each copy lives, and serves
//! aggregated views of that data:
//! - Read-through caching per entity domain (in-memory or Redis)
//! - Best-effort invalidation cascades across related domains
//! - Aggregation of flat join rows into nested BFF responses

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use infrastructure::cache::{CacheConfig, CacheFactory};
use infrastructure::services::CachePolicy;
use infrastructure::storage::InMemoryCollectionStore;
use tracing::info;

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
///
/// The cache handle is built once here and shared by every service.
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let cache_config = CacheConfig::from_settings(&config.cache)?;
    let cache = CacheFactory::new().create(&cache_config).await?;
    info!(
        backend = ?cache_config.cache_type,
        ttl_secs = cache_config.default_ttl.as_secs(),
        invalidation = ?cache_config.invalidation,
        "Cache ready"
    );

    let store = Arc::new(InMemoryCollectionStore::new());

    Ok(AppState::new(
        store,
        cache,
        CachePolicy::from(&cache_config),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_app_state_with_defaults() {
        let state = create_app_state().await.unwrap();

        assert!(state.library.list("user-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_redis_without_url_is_rejected() {
        let mut config = AppConfig::default();
        config.cache.backend = infrastructure::cache::CacheType::Redis;

        assert!(create_app_state_with_config(&config).await.is_err());
    }
}

//! Cacheable entity trait

use serde::{de::DeserializeOwned, Serialize};

/// Trait for entities that can be stored under a single-entity cache key
pub trait CacheableEntity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Identifier used as the last segment of the entity's cache key
    fn cache_id(&self) -> String;
}

//! Cache infrastructure - backends, typed entity cache and invalidation

mod entity_cache;
mod factory;
mod in_memory;
mod invalidation;
mod redis;

pub use entity_cache::{CacheNamespace, EntityCache};
pub use factory::{CacheConfig, CacheFactory, CacheType, InvalidationMode};
pub use in_memory::{InMemoryCache, InMemoryCacheConfig};
pub use invalidation::{CacheInvalidator, InvalidationOutcome, InvalidationPlan};
pub use redis::{RedisCache, RedisCacheConfig};

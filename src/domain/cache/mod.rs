//! Cache domain - shared key/value store abstraction and key scheme

mod entity;
mod key;
mod repository;

pub use entity::CacheableEntity;
pub use key::{CacheDomain, CacheKeys};
pub use repository::{Cache, CacheExt};

#[cfg(test)]
pub use repository::mock::MockCache;

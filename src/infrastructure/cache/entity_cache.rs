//! Generic per-domain cache adapter
//!
//! One `EntityCache<T>` is instantiated per domain instead of hand-writing the
//! same get/set/invalidate wrapper for every entity type.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::domain::cache::{Cache, CacheDomain, CacheExt, CacheKeys, CacheableEntity};
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_cache_lookup, CacheLookup};

use super::factory::InvalidationMode;

/// JSON written in place of a value when invalidating in tombstone mode
pub(crate) const TOMBSTONE: &str = "null";

/// Where a domain's entries live in the key space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheNamespace {
    pub domain: CacheDomain,
    /// Segment between the user and the entity id in single-entity keys
    pub subresource: &'static str,
}

impl CacheNamespace {
    pub const fn new(domain: CacheDomain, subresource: &'static str) -> Self {
        Self {
            domain,
            subresource,
        }
    }

    pub fn collection_key(&self, user_id: &str) -> String {
        CacheKeys::collection(self.domain, user_id)
    }

    pub fn single_key(&self, user_id: &str, id: &str) -> String {
        CacheKeys::entity(self.domain, user_id, self.subresource, id)
    }

    pub fn view_key(&self, user_id: &str, view: &str) -> String {
        CacheKeys::view(self.domain, user_id, view)
    }
}

/// Clears one key according to `mode`
pub(crate) async fn clear_key(
    cache: &dyn Cache,
    mode: InvalidationMode,
    ttl: Duration,
    key: &str,
) -> Result<(), DomainError> {
    match mode {
        InvalidationMode::Delete => cache.delete(key).await.map(|_| ()),
        InvalidationMode::Tombstone => cache.set_raw(key, TOMBSTONE, ttl).await,
    }
}

/// Typed cache-aside adapter for one entity type
pub struct EntityCache<T> {
    cache: Arc<dyn Cache>,
    namespace: CacheNamespace,
    ttl: Duration,
    mode: InvalidationMode,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for EntityCache<T> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            namespace: self.namespace,
            ttl: self.ttl,
            mode: self.mode,
            _entity: PhantomData,
        }
    }
}

impl<T> fmt::Debug for EntityCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityCache")
            .field("namespace", &self.namespace)
            .field("ttl", &self.ttl)
            .field("mode", &self.mode)
            .finish()
    }
}

impl<T> EntityCache<T> {
    pub fn new(cache: Arc<dyn Cache>, namespace: CacheNamespace, ttl: Duration) -> Self {
        Self {
            cache,
            namespace,
            ttl,
            mode: InvalidationMode::Delete,
            _entity: PhantomData,
        }
    }

    pub fn with_mode(mut self, mode: InvalidationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn namespace(&self) -> CacheNamespace {
        self.namespace
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn collection_key(&self, user_id: &str) -> String {
        self.namespace.collection_key(user_id)
    }

    pub fn single_key(&self, user_id: &str, id: &str) -> String {
        self.namespace.single_key(user_id, id)
    }

    pub fn view_key(&self, user_id: &str, view: &str) -> String {
        self.namespace.view_key(user_id, view)
    }

    /// Reads an aggregated projection stored under the namespace's view key
    pub async fn get_view<V>(&self, user_id: &str, view: &str) -> Result<Option<V>, DomainError>
    where
        V: DeserializeOwned + Send,
    {
        self.lookup(&self.view_key(user_id, view)).await
    }

    pub async fn set_view<V>(&self, user_id: &str, view: &str, value: &V) -> Result<(), DomainError>
    where
        V: Serialize + Send + Sync,
    {
        self.cache
            .set(&self.view_key(user_id, view), value, self.ttl)
            .await
    }

    pub async fn invalidate_user(&self, user_id: &str) -> Result<(), DomainError> {
        self.invalidate_key(&self.collection_key(user_id)).await
    }

    pub async fn invalidate_single(&self, user_id: &str, id: &str) -> Result<(), DomainError> {
        self.invalidate_key(&self.single_key(user_id, id)).await
    }

    pub async fn invalidate_view(&self, user_id: &str, view: &str) -> Result<(), DomainError> {
        self.invalidate_key(&self.view_key(user_id, view)).await
    }

    async fn invalidate_key(&self, key: &str) -> Result<(), DomainError> {
        clear_key(self.cache.as_ref(), self.mode, self.ttl, key).await
    }

    /// Reads `key`, treating a tombstone as a miss
    async fn lookup<V>(&self, key: &str) -> Result<Option<V>, DomainError>
    where
        V: DeserializeOwned + Send,
    {
        let domain = self.namespace.domain;

        match self.cache.get::<Option<V>>(key).await {
            Ok(Some(Some(value))) => {
                debug!(key = %key, "Cache hit");
                record_cache_lookup(domain, CacheLookup::Hit);
                Ok(Some(value))
            }
            Ok(_) => {
                debug!(key = %key, "Cache miss");
                record_cache_lookup(domain, CacheLookup::Miss);
                Ok(None)
            }
            Err(e) => {
                record_cache_lookup(domain, CacheLookup::Error);
                Err(e)
            }
        }
    }
}

impl<T: CacheableEntity> EntityCache<T> {
    pub async fn get_collection(&self, user_id: &str) -> Result<Option<Vec<T>>, DomainError> {
        self.lookup(&self.collection_key(user_id)).await
    }

    pub async fn set_collection(&self, user_id: &str, items: &[T]) -> Result<(), DomainError> {
        self.cache
            .set(&self.collection_key(user_id), items, self.ttl)
            .await
    }

    pub async fn get_single(&self, user_id: &str, id: &str) -> Result<Option<T>, DomainError> {
        self.lookup(&self.single_key(user_id, id)).await
    }

    pub async fn set_single(&self, user_id: &str, item: &T) -> Result<(), DomainError> {
        self.cache
            .set(&self.single_key(user_id, &item.cache_id()), item, self.ttl)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::MockCache;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Shelf {
        id: String,
        name: String,
    }

    impl CacheableEntity for Shelf {
        fn cache_id(&self) -> String {
            self.id.clone()
        }
    }

    const SHELVES: CacheNamespace = CacheNamespace::new(CacheDomain::Sublocation, "sublocation");

    fn shelf(id: &str) -> Shelf {
        Shelf {
            id: id.to_string(),
            name: format!("Shelf {id}"),
        }
    }

    fn entity_cache(cache: &Arc<MockCache>) -> EntityCache<Shelf> {
        EntityCache::new(cache.clone(), SHELVES, Duration::from_secs(3600))
    }

    #[test]
    fn test_namespace_keys() {
        assert_eq!(SHELVES.collection_key("42"), "sublocation:42");
        assert_eq!(SHELVES.single_key("42", "xyz"), "sublocation:42:sublocation:xyz");
        assert_eq!(SHELVES.view_key("42", "bff"), "sublocation:42:view:bff");
    }

    #[tokio::test]
    async fn test_collection_round_trip() {
        let mock = Arc::new(MockCache::new());
        let cache = entity_cache(&mock);

        assert_eq!(cache.get_collection("42").await.unwrap(), None);

        let shelves = vec![shelf("a"), shelf("b")];
        cache.set_collection("42", &shelves).await.unwrap();

        assert_eq!(cache.get_collection("42").await.unwrap(), Some(shelves));
    }

    #[tokio::test]
    async fn test_single_round_trip_uses_entity_id() {
        let mock = Arc::new(MockCache::new());
        let cache = entity_cache(&mock);

        cache.set_single("42", &shelf("xyz")).await.unwrap();

        assert!(mock.contains("sublocation:42:sublocation:xyz"));
        assert_eq!(cache.get_single("42", "xyz").await.unwrap(), Some(shelf("xyz")));
    }

    #[tokio::test]
    async fn test_invalidate_then_miss() {
        let mock = Arc::new(MockCache::new());
        let cache = entity_cache(&mock);

        cache.set_single("42", &shelf("a")).await.unwrap();
        cache.set_collection("42", &[shelf("a")]).await.unwrap();
        cache.set_view("42", "bff", &vec!["view"]).await.unwrap();

        cache.invalidate_single("42", "a").await.unwrap();
        cache.invalidate_user("42").await.unwrap();
        cache.invalidate_view("42", "bff").await.unwrap();

        assert_eq!(cache.get_single("42", "a").await.unwrap(), None);
        assert_eq!(cache.get_collection("42").await.unwrap(), None);
        assert_eq!(cache.get_view::<Vec<String>>("42", "bff").await.unwrap(), None);
        assert!(mock.keys().is_empty());
    }

    #[tokio::test]
    async fn test_tombstone_reads_as_miss() {
        let mock = Arc::new(MockCache::new());
        let cache = entity_cache(&mock).with_mode(InvalidationMode::Tombstone);

        cache.set_single("42", &shelf("a")).await.unwrap();
        cache.invalidate_single("42", "a").await.unwrap();

        assert!(mock.contains("sublocation:42:sublocation:a"));
        assert_eq!(cache.get_single("42", "a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalidating_missing_key_is_ok() {
        let mock = Arc::new(MockCache::new());
        let cache = entity_cache(&mock);

        assert!(cache.invalidate_single("42", "never-cached").await.is_ok());
    }

    #[tokio::test]
    async fn test_backend_errors_surface() {
        let mock = Arc::new(MockCache::new().with_error("connection refused"));
        let cache = entity_cache(&mock);

        assert!(cache.get_collection("42").await.is_err());
        assert!(cache.set_single("42", &shelf("a")).await.is_err());
        assert!(cache.invalidate_user("42").await.is_err());
    }

    #[tokio::test]
    async fn test_users_do_not_share_entries() {
        let mock = Arc::new(MockCache::new());
        let cache = entity_cache(&mock);

        cache.set_collection("alice", &[shelf("a")]).await.unwrap();

        assert_eq!(cache.get_collection("bob").await.unwrap(), None);
    }
}

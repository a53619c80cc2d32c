//! Cache namespaces, cascade key sets and read-path helpers shared by services

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::domain::cache::{Cache, CacheDomain};
use crate::domain::{DomainError, LibraryItem, PlacementLocation};
use crate::infrastructure::cache::{
    CacheConfig, CacheInvalidator, CacheNamespace, EntityCache, InvalidationMode, InvalidationPlan,
};

pub const LIBRARY: CacheNamespace = CacheNamespace::new(CacheDomain::Library, "game");
pub const PHYSICAL: CacheNamespace = CacheNamespace::new(CacheDomain::Physical, "location");
pub const SUBLOCATION: CacheNamespace = CacheNamespace::new(CacheDomain::Sublocation, "sublocation");
pub const DIGITAL: CacheNamespace = CacheNamespace::new(CacheDomain::Digital, "location");
pub const DASHBOARD: CacheNamespace = CacheNamespace::new(CacheDomain::Dashboard, "stats");

/// View name of the BFF projections
pub const BFF_VIEW: &str = "bff";
/// View name of the dashboard statistics
pub const STATS_VIEW: &str = "stats";

/// TTL and invalidation mode applied by every service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub ttl: Duration,
    pub invalidation: InvalidationMode,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            invalidation: InvalidationMode::Delete,
        }
    }
}

impl From<&CacheConfig> for CachePolicy {
    fn from(config: &CacheConfig) -> Self {
        Self {
            ttl: config.default_ttl,
            invalidation: config.invalidation,
        }
    }
}

impl CachePolicy {
    pub(crate) fn entity_cache<T>(&self, cache: &Arc<dyn Cache>, namespace: CacheNamespace) -> EntityCache<T> {
        EntityCache::new(Arc::clone(cache), namespace, self.ttl).with_mode(self.invalidation)
    }

    pub(crate) fn invalidator(&self, cache: &Arc<dyn Cache>) -> CacheInvalidator {
        CacheInvalidator::new(Arc::clone(cache), self.invalidation, self.ttl)
    }
}

/// Unwraps a cache read, treating a backend failure as a miss
pub(crate) fn cached<V>(result: Result<Option<V>, DomainError>, key: &str) -> Option<V> {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(key = %key, error = %e, "Cache read failed, falling back to repository");
            None
        }
    }
}

/// Logs a failed cache population; the caller still returns the fresh value
pub(crate) fn populated(result: Result<(), DomainError>, key: &str) {
    if let Err(e) = result {
        warn!(key = %key, error = %e, "Failed to populate cache");
    }
}

/// Clears an ordered series of plans after a committed write
///
/// Incomplete invalidation is logged and otherwise ignored; stale entries age
/// out with the TTL.
pub(crate) async fn run_cascade(invalidator: &CacheInvalidator, user_id: &str, plans: &[InvalidationPlan]) {
    let outcome = invalidator.invalidate_each(plans).await;

    if !outcome.is_complete() {
        warn!(
            user_id = %user_id,
            attempted = outcome.attempted,
            failed = outcome.failures.len(),
            "Cache invalidation incomplete"
        );
    }
}

/// Keys derived from a user's whole library
pub(crate) fn library_keys(plan: &mut InvalidationPlan, user_id: &str) {
    plan.push(LIBRARY.collection_key(user_id));
    plan.push(LIBRARY.view_key(user_id, BFF_VIEW));
}

pub(crate) fn library_item_keys(plan: &mut InvalidationPlan, user_id: &str, game_ids: &[i64]) {
    plan.extend(
        game_ids
            .iter()
            .map(|id| LIBRARY.single_key(user_id, &id.to_string())),
    );
}

pub(crate) fn dashboard_key(plan: &mut InvalidationPlan, user_id: &str) {
    plan.push(DASHBOARD.view_key(user_id, STATS_VIEW));
}

pub(crate) fn physical_keys(plan: &mut InvalidationPlan, user_id: &str, location_id: &str) {
    plan.push(PHYSICAL.single_key(user_id, location_id));
    plan.push(PHYSICAL.collection_key(user_id));
    plan.push(PHYSICAL.view_key(user_id, BFF_VIEW));
}

pub(crate) fn sublocation_keys(plan: &mut InvalidationPlan, user_id: &str, sublocation_id: &str) {
    plan.push(SUBLOCATION.single_key(user_id, sublocation_id));
    plan.push(SUBLOCATION.collection_key(user_id));
}

pub(crate) fn digital_keys(plan: &mut InvalidationPlan, user_id: &str, location_id: &str) {
    plan.push(DIGITAL.single_key(user_id, location_id));
    plan.push(DIGITAL.collection_key(user_id));
    plan.push(DIGITAL.view_key(user_id, BFF_VIEW));
}

/// Every location cache that embeds this item's placements
pub(crate) fn placement_keys(plan: &mut InvalidationPlan, user_id: &str, item: &LibraryItem) {
    for placement in &item.placements {
        match &placement.location {
            PlacementLocation::Physical {
                parent_location_id,
                sublocation_id,
            } => {
                sublocation_keys(plan, user_id, sublocation_id);
                physical_keys(plan, user_id, parent_location_id);
            }
            PlacementLocation::Digital {
                digital_location_id,
            } => digital_keys(plan, user_id, digital_location_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GamePlacement, Platform};

    #[test]
    fn test_namespace_keys() {
        assert_eq!(LIBRARY.single_key("42", "7"), "library:42:game:7");
        assert_eq!(DIGITAL.single_key("42", "abc"), "digital:42:location:abc");
        assert_eq!(SUBLOCATION.single_key("42", "xyz"), "sublocation:42:sublocation:xyz");
        assert_eq!(LIBRARY.view_key("42", BFF_VIEW), "library:42:view:bff");
        assert_eq!(DASHBOARD.view_key("42", STATS_VIEW), "dashboard:42:view:stats");
    }

    #[test]
    fn test_placement_keys_cover_every_location() {
        let item = LibraryItem::new(7, "Hollow Knight").with_placements(vec![
            GamePlacement::physical(Platform::new(130, "Switch"), "p1", "s1"),
            GamePlacement::digital(Platform::new(130, "Switch"), "d1"),
        ]);

        let mut plan = InvalidationPlan::new();
        placement_keys(&mut plan, "42", &item);

        assert_eq!(
            plan.keys(),
            [
                "sublocation:42:sublocation:s1",
                "sublocation:42",
                "physical:42:location:p1",
                "physical:42",
                "physical:42:view:bff",
                "digital:42:location:d1",
                "digital:42",
                "digital:42:view:bff",
            ]
        );
    }

    #[test]
    fn test_cached_swallows_errors() {
        assert_eq!(cached(Ok(Some(1)), "k"), Some(1));
        assert_eq!(cached::<i32>(Ok(None), "k"), None);
        assert_eq!(cached::<i32>(Err(DomainError::cache("down")), "k"), None);
    }
}

//! Sublocation service
//!
//! Sublocations are embedded in their parent's cached entries, so every write
//! also clears the parent physical location (both parents when a shelf moves).

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use super::cache_support::{
    cached, dashboard_key, library_item_keys, library_keys, physical_keys, populated,
    run_cascade, sublocation_keys, CachePolicy, SUBLOCATION,
};
use super::validation::require_non_empty;
use crate::domain::cache::Cache;
use crate::domain::{DomainError, Sublocation, SublocationRepository};
use crate::infrastructure::cache::{CacheInvalidator, EntityCache, InvalidationPlan};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSublocationRequest {
    pub physical_location_id: String,
    pub name: String,
    pub location_type: String,
    #[serde(default)]
    pub bg_color: Option<String>,
}

/// Partial update; setting `physicalLocationId` moves the sublocation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSublocationRequest {
    pub physical_location_id: Option<String>,
    pub name: Option<String>,
    pub location_type: Option<String>,
    pub bg_color: Option<String>,
}

pub struct SublocationService<R: SublocationRepository> {
    repository: Arc<R>,
    cache: EntityCache<Sublocation>,
    invalidator: CacheInvalidator,
}

impl<R: SublocationRepository> std::fmt::Debug for SublocationService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SublocationService")
            .field("cache", &self.cache)
            .finish()
    }
}

impl<R: SublocationRepository> SublocationService<R> {
    pub fn new(repository: Arc<R>, cache: Arc<dyn Cache>, policy: CachePolicy) -> Self {
        Self {
            repository,
            cache: policy.entity_cache(&cache, SUBLOCATION),
            invalidator: policy.invalidator(&cache),
        }
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<Sublocation>, DomainError> {
        let key = self.cache.collection_key(user_id);

        if let Some(sublocations) = cached(self.cache.get_collection(user_id).await, &key) {
            return Ok(sublocations);
        }

        let sublocations = self.repository.list(user_id).await?;
        populated(self.cache.set_collection(user_id, &sublocations).await, &key);

        Ok(sublocations)
    }

    pub async fn get(&self, user_id: &str, id: &str) -> Result<Sublocation, DomainError> {
        let key = self.cache.single_key(user_id, id);

        if let Some(sublocation) = cached(self.cache.get_single(user_id, id).await, &key) {
            return Ok(sublocation);
        }

        let sublocation = self
            .repository
            .get(user_id, id)
            .await?
            .ok_or_else(|| not_found(id))?;

        populated(self.cache.set_single(user_id, &sublocation).await, &key);

        Ok(sublocation)
    }

    pub async fn create(
        &self,
        user_id: &str,
        request: CreateSublocationRequest,
    ) -> Result<Sublocation, DomainError> {
        require_non_empty("name", &request.name)?;
        require_non_empty("locationType", &request.location_type)?;

        let mut sublocation = Sublocation::new(
            request.physical_location_id,
            request.name.trim(),
            request.location_type.trim(),
        );
        sublocation.bg_color = request.bg_color;

        let sublocation = self.repository.create(user_id, sublocation).await?;
        info!(
            user_id = %user_id,
            sublocation_id = %sublocation.id,
            parent_id = %sublocation.physical_location_id,
            "Created sublocation"
        );

        self.invalidate(
            user_id,
            &sublocation.id,
            &[sublocation.physical_location_id.as_str()],
            &[],
        )
        .await;

        Ok(sublocation)
    }

    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        request: UpdateSublocationRequest,
    ) -> Result<Sublocation, DomainError> {
        let existing = self
            .repository
            .get(user_id, id)
            .await?
            .ok_or_else(|| not_found(id))?;

        let old_parent = existing.physical_location_id.clone();
        let mut sublocation = existing;

        if let Some(parent_id) = request.physical_location_id {
            require_non_empty("physicalLocationId", &parent_id)?;
            sublocation.physical_location_id = parent_id;
        }

        if let Some(name) = request.name {
            require_non_empty("name", &name)?;
            sublocation.name = name.trim().to_string();
        }

        if let Some(location_type) = request.location_type {
            require_non_empty("locationType", &location_type)?;
            sublocation.location_type = location_type.trim().to_string();
        }

        if let Some(color) = request.bg_color {
            sublocation.bg_color = Some(color);
        }

        sublocation.touch();

        let moved = old_parent != sublocation.physical_location_id;
        // Moving rewrites the parent id held in each shelved game's placements
        let game_ids = if moved {
            self.repository.stored_game_ids(user_id, id).await?
        } else {
            Vec::new()
        };

        let sublocation = self.repository.update(user_id, sublocation).await?;
        info!(user_id = %user_id, sublocation_id = %id, moved = moved, "Updated sublocation");

        self.invalidate(
            user_id,
            id,
            &[old_parent.as_str(), sublocation.physical_location_id.as_str()],
            &game_ids,
        )
        .await;

        Ok(sublocation)
    }

    pub async fn delete(&self, user_id: &str, id: &str) -> Result<bool, DomainError> {
        // Parent must be read before the row is gone
        let Some(existing) = self.repository.get(user_id, id).await? else {
            return Ok(false);
        };
        let game_ids = self.repository.stored_game_ids(user_id, id).await?;

        let deleted = self.repository.delete(user_id, id).await?;

        if deleted {
            info!(user_id = %user_id, sublocation_id = %id, "Deleted sublocation");

            self.invalidate(user_id, id, &[existing.physical_location_id.as_str()], &game_ids)
                .await;
        }

        Ok(deleted)
    }

    async fn invalidate(&self, user_id: &str, id: &str, parent_ids: &[&str], game_ids: &[i64]) {
        let mut own = InvalidationPlan::new();
        sublocation_keys(&mut own, user_id, id);

        let mut cascade = InvalidationPlan::new();
        for parent_id in parent_ids {
            physical_keys(&mut cascade, user_id, parent_id);
        }
        cascade.push(SUBLOCATION.collection_key(user_id));
        library_keys(&mut cascade, user_id);
        library_item_keys(&mut cascade, user_id, game_ids);
        dashboard_key(&mut cascade, user_id);

        run_cascade(&self.invalidator, user_id, &[own, cascade]).await;
    }
}

fn not_found(id: &str) -> DomainError {
    DomainError::not_found(format!("Sublocation '{}' not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::MockCache;
    use crate::domain::physical::MockSublocationRepository;
    use crate::domain::{LibraryRepository, PhysicalLocation, PhysicalLocationRepository, PlacementLocation};
    use crate::infrastructure::services::cache_support::PHYSICAL;
    use crate::infrastructure::storage::fixtures::{seeded_store, USER};
    use crate::infrastructure::storage::InMemoryCollectionStore;

    fn service(
        store: &Arc<InMemoryCollectionStore>,
        cache: &Arc<MockCache>,
    ) -> SublocationService<InMemoryCollectionStore> {
        SublocationService::new(store.clone(), cache.clone(), CachePolicy::default())
    }

    #[tokio::test]
    async fn test_update_invalidates_sublocation_and_parent() {
        let store = Arc::new(seeded_store().await);
        let cache = Arc::new(MockCache::new());
        let service = service(&store, &cache);

        // Seed both caches through the read path
        service.get(USER, "s1").await.unwrap();
        let parent = PhysicalLocationRepository::get(store.as_ref(), USER, "p1")
            .await
            .unwrap()
            .unwrap();
        let physical: EntityCache<PhysicalLocation> =
            CachePolicy::default().entity_cache(&(cache.clone() as Arc<dyn Cache>), PHYSICAL);
        physical.set_single(USER, &parent).await.unwrap();

        assert!(cache.contains("sublocation:user-1:sublocation:s1"));
        assert!(cache.contains("physical:user-1:location:p1"));

        let request = UpdateSublocationRequest {
            name: Some("Bottom Shelf".to_string()),
            ..Default::default()
        };
        service.update(USER, "s1", request).await.unwrap();

        assert_eq!(service.cache.get_single(USER, "s1").await.unwrap(), None);
        assert_eq!(physical.get_single(USER, "p1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_move_invalidates_both_parents_and_games() {
        let store = Arc::new(seeded_store().await);
        PhysicalLocationRepository::create(
            store.as_ref(),
            USER,
            PhysicalLocation::new("Office", "room").with_id("p2"),
        )
        .await
        .unwrap();

        let cache = Arc::new(
            MockCache::new()
                .with_entry("physical:user-1:location:p1", &0, None)
                .with_entry("physical:user-1:location:p2", &0, None)
                .with_entry("library:user-1:game:7", &0, None),
        );
        let service = service(&store, &cache);

        let request = UpdateSublocationRequest {
            physical_location_id: Some("p2".to_string()),
            ..Default::default()
        };
        let moved = service.update(USER, "s1", request).await.unwrap();

        assert_eq!(moved.physical_location_id, "p2");
        assert!(cache.keys().is_empty());

        let game = LibraryRepository::get(store.as_ref(), USER, 7).await.unwrap().unwrap();
        assert!(game.placements.iter().any(|p| matches!(
            &p.location,
            PlacementLocation::Physical { parent_location_id, .. } if parent_location_id == "p2"
        )));
    }

    #[tokio::test]
    async fn test_delete_uses_parent_read_before_delete() {
        let store = Arc::new(seeded_store().await);
        let cache = Arc::new(
            MockCache::new()
                .with_entry("physical:user-1:location:p1", &0, None)
                .with_entry("physical:user-1:view:bff", &0, None)
                .with_entry("sublocation:user-1:sublocation:s1", &0, None),
        );
        let service = service(&store, &cache);

        assert!(service.delete(USER, "s1").await.unwrap());
        assert!(cache.keys().is_empty());
        assert!(service.get(USER, "s1").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_create_for_missing_parent_is_not_found() {
        let store = Arc::new(InMemoryCollectionStore::new());
        let cache = Arc::new(MockCache::new().with_entry("sublocation:user-1", &0, None));

        let request = CreateSublocationRequest {
            physical_location_id: "ghost".to_string(),
            name: "Shelf".to_string(),
            location_type: "shelf".to_string(),
            bg_color: None,
        };

        let err = service(&store, &cache).create(USER, request).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(cache.contains("sublocation:user-1"));
    }

    #[tokio::test]
    async fn test_create_clears_parent() {
        let store = Arc::new(seeded_store().await);
        let cache = Arc::new(
            MockCache::new()
                .with_entry("physical:user-1:location:p1", &0, None)
                .with_entry("sublocation:user-1", &0, None),
        );

        let request = CreateSublocationRequest {
            physical_location_id: "p1".to_string(),
            name: "Drawer".to_string(),
            location_type: "drawer".to_string(),
            bg_color: Some("red".to_string()),
        };

        let sublocation = service(&store, &cache).create(USER, request).await.unwrap();
        assert_eq!(sublocation.bg_color.as_deref(), Some("red"));
        assert!(cache.keys().is_empty());
    }

    #[tokio::test]
    async fn test_invalidation_failure_does_not_fail_update() {
        let store = Arc::new(seeded_store().await);
        let cache = Arc::new(MockCache::new().with_write_error("connection reset"));

        let request = UpdateSublocationRequest {
            bg_color: Some("green".to_string()),
            ..Default::default()
        };

        let updated = service(&store, &cache).update(USER, "s1", request).await.unwrap();
        assert_eq!(updated.bg_color.as_deref(), Some("green"));
    }

    #[tokio::test]
    async fn test_repository_errors_propagate() {
        let mut repo = MockSublocationRepository::new();
        repo.expect_get()
            .returning(|_, _| Err(DomainError::storage("query failed")));

        let cache = Arc::new(MockCache::new());
        let service = SublocationService::new(Arc::new(repo), cache.clone(), CachePolicy::default());

        let err = service.delete(USER, "s1").await.unwrap_err();
        assert!(matches!(err, DomainError::Storage { .. }));
    }
}

//! Physical location service

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use super::cache_support::{
    cached, dashboard_key, library_item_keys, library_keys, physical_keys, populated,
    run_cascade, CachePolicy, BFF_VIEW, PHYSICAL, SUBLOCATION,
};
use super::validation::require_non_empty;
use crate::domain::aggregation::{build_physical_bff, PhysicalBffResponse};
use crate::domain::cache::Cache;
use crate::domain::{DomainError, PhysicalLocation, PhysicalLocationRepository};
use crate::infrastructure::cache::{CacheInvalidator, EntityCache, InvalidationPlan};

/// Request to create a physical location
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePhysicalLocationRequest {
    pub name: String,
    pub location_type: String,
    #[serde(default)]
    pub map_coordinates: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePhysicalLocationRequest {
    pub name: Option<String>,
    pub location_type: Option<String>,
    pub map_coordinates: Option<String>,
}

pub struct PhysicalLocationService<R: PhysicalLocationRepository> {
    repository: Arc<R>,
    cache: EntityCache<PhysicalLocation>,
    invalidator: CacheInvalidator,
}

impl<R: PhysicalLocationRepository> std::fmt::Debug for PhysicalLocationService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicalLocationService")
            .field("cache", &self.cache)
            .finish()
    }
}

impl<R: PhysicalLocationRepository> PhysicalLocationService<R> {
    pub fn new(repository: Arc<R>, cache: Arc<dyn Cache>, policy: CachePolicy) -> Self {
        Self {
            repository,
            cache: policy.entity_cache(&cache, PHYSICAL),
            invalidator: policy.invalidator(&cache),
        }
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<PhysicalLocation>, DomainError> {
        let key = self.cache.collection_key(user_id);

        if let Some(locations) = cached(self.cache.get_collection(user_id).await, &key) {
            return Ok(locations);
        }

        let locations = self.repository.list(user_id).await?;
        populated(self.cache.set_collection(user_id, &locations).await, &key);

        Ok(locations)
    }

    pub async fn get(&self, user_id: &str, id: &str) -> Result<PhysicalLocation, DomainError> {
        let key = self.cache.single_key(user_id, id);

        if let Some(location) = cached(self.cache.get_single(user_id, id).await, &key) {
            return Ok(location);
        }

        let location = self
            .repository
            .get(user_id, id)
            .await?
            .ok_or_else(|| not_found(id))?;

        populated(self.cache.set_single(user_id, &location).await, &key);

        Ok(location)
    }

    /// Locations with their sublocations and the games shelved in each
    pub async fn bff(&self, user_id: &str) -> Result<PhysicalBffResponse, DomainError> {
        let key = self.cache.view_key(user_id, BFF_VIEW);

        if let Some(response) = cached(self.cache.get_view(user_id, BFF_VIEW).await, &key) {
            return Ok(response);
        }

        let rows = self.repository.physical_rows(user_id).await?;
        let response = build_physical_bff(&rows);

        populated(self.cache.set_view(user_id, BFF_VIEW, &response).await, &key);

        Ok(response)
    }

    pub async fn create(
        &self,
        user_id: &str,
        request: CreatePhysicalLocationRequest,
    ) -> Result<PhysicalLocation, DomainError> {
        require_non_empty("name", &request.name)?;
        require_non_empty("locationType", &request.location_type)?;

        let mut location = PhysicalLocation::new(request.name.trim(), request.location_type.trim());
        location.map_coordinates = request.map_coordinates;

        let location = self.repository.create(user_id, location).await?;
        info!(user_id = %user_id, location_id = %location.id, "Created physical location");

        self.invalidate(user_id, &location.id, &[], &[]).await;

        Ok(location)
    }

    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        request: UpdatePhysicalLocationRequest,
    ) -> Result<PhysicalLocation, DomainError> {
        let mut location = self
            .repository
            .get(user_id, id)
            .await?
            .ok_or_else(|| not_found(id))?;

        if let Some(name) = request.name {
            require_non_empty("name", &name)?;
            location.name = name.trim().to_string();
        }

        if let Some(location_type) = request.location_type {
            require_non_empty("locationType", &location_type)?;
            location.location_type = location_type.trim().to_string();
        }

        if let Some(coordinates) = request.map_coordinates {
            location.map_coordinates = Some(coordinates);
        }

        location.touch();

        let location = self.repository.update(user_id, location).await?;
        info!(user_id = %user_id, location_id = %id, "Updated physical location");

        self.invalidate(user_id, id, &[], &[]).await;

        Ok(location)
    }

    /// Delete a location together with its sublocations and the copies shelved there
    pub async fn delete(&self, user_id: &str, id: &str) -> Result<bool, DomainError> {
        let Some(existing) = self.repository.get(user_id, id).await? else {
            return Ok(false);
        };

        let sublocation_ids: Vec<String> =
            existing.sublocations.iter().map(|s| s.id.clone()).collect();
        let game_ids = self.repository.stored_game_ids(user_id, id).await?;

        let deleted = self.repository.delete(user_id, id).await?;

        if deleted {
            info!(
                user_id = %user_id,
                location_id = %id,
                sublocations = sublocation_ids.len(),
                games = game_ids.len(),
                "Deleted physical location"
            );

            self.invalidate(user_id, id, &sublocation_ids, &game_ids)
                .await;
        }

        Ok(deleted)
    }

    async fn invalidate(
        &self,
        user_id: &str,
        id: &str,
        sublocation_ids: &[String],
        game_ids: &[i64],
    ) {
        let mut own = InvalidationPlan::new();
        physical_keys(&mut own, user_id, id);

        let mut cascade = InvalidationPlan::new();
        cascade.push(PHYSICAL.collection_key(user_id));
        cascade.push(SUBLOCATION.collection_key(user_id));
        cascade.extend(
            sublocation_ids
                .iter()
                .map(|sub_id| SUBLOCATION.single_key(user_id, sub_id)),
        );
        library_keys(&mut cascade, user_id);
        library_item_keys(&mut cascade, user_id, game_ids);
        dashboard_key(&mut cascade, user_id);

        run_cascade(&self.invalidator, user_id, &[own, cascade]).await;
    }
}

fn not_found(id: &str) -> DomainError {
    DomainError::not_found(format!("Physical location '{}' not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::MockCache;
    use crate::domain::physical::MockPhysicalLocationRepository;
    use crate::domain::LibraryRepository;
    use crate::infrastructure::storage::fixtures::{seeded_store, USER};
    use crate::infrastructure::storage::InMemoryCollectionStore;

    fn service(
        store: &Arc<InMemoryCollectionStore>,
        cache: &Arc<MockCache>,
    ) -> PhysicalLocationService<InMemoryCollectionStore> {
        PhysicalLocationService::new(store.clone(), cache.clone(), CachePolicy::default())
    }

    #[tokio::test]
    async fn test_get_populates_single_key() {
        let store = Arc::new(seeded_store().await);
        let cache = Arc::new(MockCache::new());
        let service = service(&store, &cache);

        let location = service.get(USER, "p1").await.unwrap();

        assert_eq!(location.name, "Living Room");
        assert_eq!(location.sublocations.len(), 1);
        assert!(cache.contains("physical:user-1:location:p1"));
    }

    #[tokio::test]
    async fn test_bff_nests_sublocations_and_games() {
        let store = Arc::new(seeded_store().await);
        let cache = Arc::new(MockCache::new());
        let service = service(&store, &cache);

        let bff = service.bff(USER).await.unwrap();
        let location = &bff.physical_locations[0];

        assert_eq!(location.id, "p1");
        assert_eq!(location.sublocations[0].stored_items, 1);
        assert_eq!(location.sublocations[0].items[0].name, "Hollow Knight");
        assert!(cache.contains("physical:user-1:view:bff"));
    }

    #[tokio::test]
    async fn test_update_invalidates_dependent_views() {
        let store = Arc::new(seeded_store().await);
        let cache = Arc::new(
            MockCache::new()
                .with_entry("physical:user-1:location:p1", &0, None)
                .with_entry("physical:user-1", &0, None)
                .with_entry("physical:user-1:view:bff", &0, None)
                .with_entry("sublocation:user-1", &0, None)
                .with_entry("library:user-1:view:bff", &0, None)
                .with_entry("dashboard:user-1:view:stats", &0, None),
        );
        let service = service(&store, &cache);

        let request = UpdatePhysicalLocationRequest {
            name: Some("Den".to_string()),
            ..Default::default()
        };
        let location = service.update(USER, "p1", request).await.unwrap();

        assert_eq!(location.name, "Den");
        assert!(cache.keys().is_empty());
    }

    #[tokio::test]
    async fn test_delete_invalidates_children_and_shelved_games() {
        let store = Arc::new(seeded_store().await);
        let cache = Arc::new(
            MockCache::new()
                .with_entry("sublocation:user-1:sublocation:s1", &0, None)
                .with_entry("library:user-1:game:7", &0, None)
                .with_entry("digital:user-1:location:d1", &0, None),
        );
        let service = service(&store, &cache);

        assert!(service.delete(USER, "p1").await.unwrap());

        assert_eq!(cache.keys(), vec!["digital:user-1:location:d1".to_string()]);

        let game = LibraryRepository::get(store.as_ref(), USER, 7).await.unwrap().unwrap();
        assert_eq!(game.physical_locations().count(), 0);
    }

    #[tokio::test]
    async fn test_delete_missing_returns_false() {
        let store = Arc::new(InMemoryCollectionStore::new());
        let cache = Arc::new(MockCache::new());

        assert!(!service(&store, &cache).delete(USER, "nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_validates_fields() {
        let store = Arc::new(InMemoryCollectionStore::new());
        let cache = Arc::new(MockCache::new());

        let request = CreatePhysicalLocationRequest {
            name: "Attic".to_string(),
            location_type: "".to_string(),
            map_coordinates: None,
        };

        let err = service(&store, &cache).create(USER, request).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_read_error_falls_through() {
        let store = Arc::new(seeded_store().await);
        let cache = Arc::new(MockCache::new().with_error("timeout"));

        let locations = service(&store, &cache).list(USER).await.unwrap();
        assert_eq!(locations.len(), 1);
    }

    #[tokio::test]
    async fn test_repository_errors_propagate() {
        let mut repo = MockPhysicalLocationRepository::new();
        repo.expect_physical_rows()
            .returning(|_| Err(DomainError::storage("query failed")));

        let cache = Arc::new(MockCache::new());
        let service =
            PhysicalLocationService::new(Arc::new(repo), cache.clone(), CachePolicy::default());

        assert!(service.bff(USER).await.is_err());
        assert!(!cache.contains("physical:user-1:view:bff"));
    }
}

//! Library service - cached reads and cascading writes for library items

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use super::cache_support::{
    cached, dashboard_key, library_item_keys, library_keys, placement_keys, populated,
    run_cascade, CachePolicy, BFF_VIEW, LIBRARY,
};
use crate::domain::aggregation::{build_library_bff, LibraryBffResponse};
use crate::domain::cache::Cache;
use crate::domain::{DomainError, GamePlacement, LibraryItem, LibraryRepository};
use crate::infrastructure::cache::{CacheInvalidator, EntityCache, InvalidationPlan};

/// Request to add a game to the library
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLibraryItemRequest {
    pub game_id: i64,
    pub name: String,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub first_release_date: Option<i64>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub is_in_wishlist: bool,
    #[serde(default)]
    pub placements: Vec<GamePlacement>,
}

/// Partial update of a library item; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLibraryItemRequest {
    pub name: Option<String>,
    pub cover_url: Option<String>,
    pub rating: Option<f64>,
    pub themes: Option<Vec<String>>,
    pub is_favorite: Option<bool>,
    pub is_in_wishlist: Option<bool>,
    pub placements: Option<Vec<GamePlacement>>,
}

/// Library service with cache-aside reads
pub struct LibraryService<R: LibraryRepository> {
    repository: Arc<R>,
    cache: EntityCache<LibraryItem>,
    invalidator: CacheInvalidator,
}

impl<R: LibraryRepository> std::fmt::Debug for LibraryService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryService")
            .field("cache", &self.cache)
            .finish()
    }
}

impl<R: LibraryRepository> LibraryService<R> {
    pub fn new(repository: Arc<R>, cache: Arc<dyn Cache>, policy: CachePolicy) -> Self {
        Self {
            repository,
            cache: policy.entity_cache(&cache, LIBRARY),
            invalidator: policy.invalidator(&cache),
        }
    }

    /// List every item in the user's library
    pub async fn list(&self, user_id: &str) -> Result<Vec<LibraryItem>, DomainError> {
        let key = self.cache.collection_key(user_id);

        if let Some(items) = cached(self.cache.get_collection(user_id).await, &key) {
            return Ok(items);
        }

        let items = self.repository.list(user_id).await?;
        populated(self.cache.set_collection(user_id, &items).await, &key);

        Ok(items)
    }

    /// Get a single item, returning not-found when the game is not in the library
    pub async fn get(&self, user_id: &str, game_id: i64) -> Result<LibraryItem, DomainError> {
        let id = game_id.to_string();
        let key = self.cache.single_key(user_id, &id);

        if let Some(item) = cached(self.cache.get_single(user_id, &id).await, &key) {
            return Ok(item);
        }

        let item = self
            .repository
            .get(user_id, game_id)
            .await?
            .ok_or_else(|| not_found(game_id))?;

        populated(self.cache.set_single(user_id, &item).await, &key);

        Ok(item)
    }

    /// Library BFF: every item with grouped locations plus the recently added slice
    pub async fn bff(&self, user_id: &str) -> Result<LibraryBffResponse, DomainError> {
        let key = self.cache.view_key(user_id, BFF_VIEW);

        if let Some(response) = cached(self.cache.get_view(user_id, BFF_VIEW).await, &key) {
            return Ok(response);
        }

        let rows = self.repository.library_rows(user_id).await?;
        let response = build_library_bff(&rows, Utc::now());

        populated(self.cache.set_view(user_id, BFF_VIEW, &response).await, &key);

        Ok(response)
    }

    pub async fn create(
        &self,
        user_id: &str,
        request: CreateLibraryItemRequest,
    ) -> Result<LibraryItem, DomainError> {
        validate_name(&request.name)?;

        let mut item = LibraryItem::new(request.game_id, request.name.trim())
            .with_placements(request.placements);
        item.cover_url = request.cover_url;
        item.first_release_date = request.first_release_date;
        item.rating = request.rating;
        item.themes = request.themes;
        item.is_favorite = request.is_favorite;
        item.is_in_wishlist = request.is_in_wishlist;

        let item = self.repository.create(user_id, item).await?;
        info!(user_id = %user_id, game_id = item.game_id, "Added game to library");

        self.invalidate(user_id, None, &[&item]).await;

        Ok(item)
    }

    pub async fn update(
        &self,
        user_id: &str,
        game_id: i64,
        request: UpdateLibraryItemRequest,
    ) -> Result<LibraryItem, DomainError> {
        let before = self
            .repository
            .get(user_id, game_id)
            .await?
            .ok_or_else(|| not_found(game_id))?;

        let mut item = before.clone();

        if let Some(name) = request.name {
            validate_name(&name)?;
            item.name = name.trim().to_string();
        }

        if let Some(cover_url) = request.cover_url {
            item.cover_url = Some(cover_url);
        }

        if let Some(rating) = request.rating {
            item.rating = Some(rating);
        }

        if let Some(themes) = request.themes {
            item.themes = themes;
        }

        if let Some(favorite) = request.is_favorite {
            item.set_favorite(favorite);
        }

        if let Some(in_wishlist) = request.is_in_wishlist {
            item.set_in_wishlist(in_wishlist);
        }

        if let Some(placements) = request.placements {
            item.set_placements(placements);
        }

        let item = self.repository.update(user_id, item).await?;
        info!(user_id = %user_id, game_id = game_id, "Updated library item");

        self.invalidate(user_id, Some(game_id), &[&before, &item])
            .await;

        Ok(item)
    }

    /// Remove a game; returns false when it was not in the library
    pub async fn delete(&self, user_id: &str, game_id: i64) -> Result<bool, DomainError> {
        let before = self.repository.get(user_id, game_id).await?;

        let deleted = self.repository.delete(user_id, game_id).await?;

        if deleted {
            info!(user_id = %user_id, game_id = game_id, "Removed game from library");

            let affected: Vec<&LibraryItem> = before.iter().collect();
            self.invalidate(user_id, Some(game_id), &affected).await;
        }

        Ok(deleted)
    }

    /// Library keys first, then every location and aggregate the item feeds into
    async fn invalidate(&self, user_id: &str, game_id: Option<i64>, affected: &[&LibraryItem]) {
        let mut own = InvalidationPlan::new();
        library_keys(&mut own, user_id);
        if let Some(game_id) = game_id {
            library_item_keys(&mut own, user_id, &[game_id]);
        }

        let mut cascade = InvalidationPlan::new();
        library_keys(&mut cascade, user_id);
        dashboard_key(&mut cascade, user_id);
        for item in affected {
            placement_keys(&mut cascade, user_id, item);
        }

        run_cascade(&self.invalidator, user_id, &[own, cascade]).await;
    }
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("Game name cannot be empty"));
    }

    Ok(())
}

fn not_found(game_id: i64) -> DomainError {
    DomainError::not_found(format!("Game {} is not in the library", game_id))
}

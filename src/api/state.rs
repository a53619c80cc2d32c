//! Application state for shared services

use std::sync::Arc;

use crate::domain::cache::Cache;
use crate::infrastructure::services::{
    CachePolicy, DashboardService, DigitalLocationService, LibraryService,
    PhysicalLocationService, SublocationService,
};
use crate::infrastructure::storage::InMemoryCollectionStore;

/// DB adapter backing every service
pub type CollectionStore = InMemoryCollectionStore;

/// Services shared by every request
///
/// All services hold the same cache handle, created once at startup.
#[derive(Clone)]
pub struct AppState {
    pub library: Arc<LibraryService<CollectionStore>>,
    pub physical_locations: Arc<PhysicalLocationService<CollectionStore>>,
    pub sublocations: Arc<SublocationService<CollectionStore>>,
    pub digital_locations: Arc<DigitalLocationService<CollectionStore>>,
    pub dashboard: Arc<DashboardService<CollectionStore>>,
    pub cache: Arc<dyn Cache>,
}

impl AppState {
    pub fn new(store: Arc<CollectionStore>, cache: Arc<dyn Cache>, policy: CachePolicy) -> Self {
        Self {
            library: Arc::new(LibraryService::new(store.clone(), cache.clone(), policy)),
            physical_locations: Arc::new(PhysicalLocationService::new(
                store.clone(),
                cache.clone(),
                policy,
            )),
            sublocations: Arc::new(SublocationService::new(store.clone(), cache.clone(), policy)),
            digital_locations: Arc::new(DigitalLocationService::new(
                store.clone(),
                cache.clone(),
                policy,
            )),
            dashboard: Arc::new(DashboardService::new(store, cache.clone(), policy)),
            cache,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

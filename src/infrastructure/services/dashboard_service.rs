//! Dashboard statistics service
//!
//! Read-only: the cached stats are cleared by the write paths of the other
//! services.

use std::sync::Arc;

use chrono::Utc;

use super::cache_support::{cached, populated, CachePolicy, DASHBOARD, STATS_VIEW};
use crate::domain::aggregation::{build_dashboard, DashboardStats};
use crate::domain::cache::Cache;
use crate::domain::{DashboardRepository, DomainError};
use crate::infrastructure::cache::EntityCache;

pub struct DashboardService<R: DashboardRepository> {
    repository: Arc<R>,
    cache: EntityCache<DashboardStats>,
}

impl<R: DashboardRepository> std::fmt::Debug for DashboardService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardService")
            .field("cache", &self.cache)
            .finish()
    }
}

impl<R: DashboardRepository> DashboardService<R> {
    pub fn new(repository: Arc<R>, cache: Arc<dyn Cache>, policy: CachePolicy) -> Self {
        Self {
            repository,
            cache: policy.entity_cache(&cache, DASHBOARD),
        }
    }

    pub async fn get(&self, user_id: &str) -> Result<DashboardStats, DomainError> {
        let key = self.cache.view_key(user_id, STATS_VIEW);

        if let Some(stats) = cached(self.cache.get_view(user_id, STATS_VIEW).await, &key) {
            return Ok(stats);
        }

        let rows = self.repository.dashboard_rows(user_id).await?;
        let stats = build_dashboard(&rows, Utc::now());

        populated(self.cache.set_view(user_id, STATS_VIEW, &stats).await, &key);

        Ok(stats)
    }
}

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::domain::aggregation::DashboardRowSet;
use crate::domain::DomainError;

/// Collection-wide rows the dashboard statistics are derived from
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DashboardRepository: Send + Sync {
    async fn dashboard_rows(&self, user_id: &str) -> Result<DashboardRowSet, DomainError>;
}

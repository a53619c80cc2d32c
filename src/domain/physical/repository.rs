//! Physical location and sublocation repository traits

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::entity::{PhysicalLocation, Sublocation};
use crate::domain::aggregation::PhysicalLocationRow;
use crate::domain::DomainError;

/// DB adapter for physical locations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PhysicalLocationRepository: Send + Sync {
    /// List the user's physical locations with their sublocations
    async fn list(&self, user_id: &str) -> Result<Vec<PhysicalLocation>, DomainError>;

    /// Get a physical location with its sublocations
    async fn get(&self, user_id: &str, id: &str) -> Result<Option<PhysicalLocation>, DomainError>;

    async fn create(
        &self,
        user_id: &str,
        location: PhysicalLocation,
    ) -> Result<PhysicalLocation, DomainError>;

    async fn update(
        &self,
        user_id: &str,
        location: PhysicalLocation,
    ) -> Result<PhysicalLocation, DomainError>;

    /// Delete a location; its sublocations and the copies shelved in them go with it
    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, DomainError>;

    /// Ids of the games with a copy anywhere in this location
    async fn stored_game_ids(&self, user_id: &str, id: &str) -> Result<Vec<i64>, DomainError>;

    /// Flat location × sublocation × game rows for the physical view
    async fn physical_rows(&self, user_id: &str) -> Result<Vec<PhysicalLocationRow>, DomainError>;
}

/// DB adapter for sublocations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SublocationRepository: Send + Sync {
    async fn list(&self, user_id: &str) -> Result<Vec<Sublocation>, DomainError>;

    async fn get(&self, user_id: &str, id: &str) -> Result<Option<Sublocation>, DomainError>;

    /// Create a sublocation; fails with not-found when the parent is missing
    async fn create(&self, user_id: &str, sublocation: Sublocation)
    -> Result<Sublocation, DomainError>;

    async fn update(&self, user_id: &str, sublocation: Sublocation)
    -> Result<Sublocation, DomainError>;

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, DomainError>;

    /// Ids of the games with a copy on this sublocation
    async fn stored_game_ids(&self, user_id: &str, id: &str) -> Result<Vec<i64>, DomainError>;
}

//! Digital location repository trait

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::entity::{DigitalLocation, Payment, Subscription};
use crate::domain::aggregation::DigitalLocationRow;
use crate::domain::DomainError;

/// DB adapter for digital locations and their subscriptions
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DigitalLocationRepository: Send + Sync {
    async fn list(&self, user_id: &str) -> Result<Vec<DigitalLocation>, DomainError>;

    async fn get(&self, user_id: &str, id: &str) -> Result<Option<DigitalLocation>, DomainError>;

    async fn create(
        &self,
        user_id: &str,
        location: DigitalLocation,
    ) -> Result<DigitalLocation, DomainError>;

    async fn update(
        &self,
        user_id: &str,
        location: DigitalLocation,
    ) -> Result<DigitalLocation, DomainError>;

    /// Delete a location along with its subscription, payments and placements
    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, DomainError>;

    /// Create or replace the subscription of a location
    async fn upsert_subscription(
        &self,
        user_id: &str,
        location_id: &str,
        subscription: Subscription,
    ) -> Result<DigitalLocation, DomainError>;

    /// Remove the subscription, returns true if one existed
    async fn remove_subscription(&self, user_id: &str, location_id: &str)
    -> Result<bool, DomainError>;

    async fn add_payment(
        &self,
        user_id: &str,
        location_id: &str,
        payment: Payment,
    ) -> Result<Payment, DomainError>;

    /// Ids of the games held in this location
    async fn stored_game_ids(&self, user_id: &str, id: &str) -> Result<Vec<i64>, DomainError>;

    /// Flat location × game rows for the digital view
    async fn digital_rows(&self, user_id: &str) -> Result<Vec<DigitalLocationRow>, DomainError>;
}

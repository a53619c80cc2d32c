//! Digital location service: storefronts, subscriptions and payments

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;

use super::cache_support::{
    cached, dashboard_key, digital_keys, library_item_keys, library_keys, populated,
    run_cascade, CachePolicy, BFF_VIEW, DIGITAL,
};
use super::validation::{require_amount, require_non_empty};
use crate::domain::aggregation::{build_digital_bff, DigitalBffResponse};
use crate::domain::cache::Cache;
use crate::domain::{
    BillingCycle, DigitalLocation, DigitalLocationRepository, DomainError, Payment, Subscription,
};
use crate::infrastructure::cache::{CacheInvalidator, EntityCache, InvalidationPlan};

/// Subscription terms as submitted by clients
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    /// "1 month", "3 month", "6 month" or "12 month"
    pub billing_cycle: String,
    pub cost_per_cycle: f64,
    pub anchor_date: NaiveDate,
    #[serde(default)]
    pub payment_method: Option<String>,
}

impl SubscriptionRequest {
    fn into_subscription(self) -> Result<Subscription, DomainError> {
        let cycle: BillingCycle = self.billing_cycle.parse()?;
        require_amount("costPerCycle", self.cost_per_cycle)?;

        let mut subscription = Subscription::new(cycle, self.cost_per_cycle, self.anchor_date);
        if let Some(method) = self.payment_method {
            subscription = subscription.with_payment_method(method);
        }

        Ok(subscription)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDigitalLocationRequest {
    pub name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub subscription: Option<SubscriptionRequest>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDigitalLocationRequest {
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentRequest {
    pub amount: f64,
    pub payment_date: NaiveDate,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
}

pub struct DigitalLocationService<R: DigitalLocationRepository> {
    repository: Arc<R>,
    cache: EntityCache<DigitalLocation>,
    invalidator: CacheInvalidator,
}

impl<R: DigitalLocationRepository> std::fmt::Debug for DigitalLocationService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigitalLocationService")
            .field("cache", &self.cache)
            .finish()
    }
}

impl<R: DigitalLocationRepository> DigitalLocationService<R> {
    pub fn new(repository: Arc<R>, cache: Arc<dyn Cache>, policy: CachePolicy) -> Self {
        Self {
            repository,
            cache: policy.entity_cache(&cache, DIGITAL),
            invalidator: policy.invalidator(&cache),
        }
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<DigitalLocation>, DomainError> {
        let key = self.cache.collection_key(user_id);

        if let Some(locations) = cached(self.cache.get_collection(user_id).await, &key) {
            return Ok(locations);
        }

        let locations = self.repository.list(user_id).await?;
        populated(self.cache.set_collection(user_id, &locations).await, &key);

        Ok(locations)
    }

    pub async fn get(&self, user_id: &str, id: &str) -> Result<DigitalLocation, DomainError> {
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

    /// Locations with normalized subscription costs and their games
    pub async fn bff(&self, user_id: &str) -> Result<DigitalBffResponse, DomainError> {
        let key = self.cache.view_key(user_id, BFF_VIEW);

        if let Some(response) = cached(self.cache.get_view(user_id, BFF_VIEW).await, &key) {
            return Ok(response);
        }

        let rows = self.repository.digital_rows(user_id).await?;
        let response = build_digital_bff(&rows, Utc::now());

        populated(self.cache.set_view(user_id, BFF_VIEW, &response).await, &key);

        Ok(response)
    }

    pub async fn create(
        &self,
        user_id: &str,
        request: CreateDigitalLocationRequest,
    ) -> Result<DigitalLocation, DomainError> {
        require_non_empty("name", &request.name)?;

        let mut location = DigitalLocation::new(request.name.trim());
        location.is_active = request.is_active;
        location.url = request.url;

        if let Some(subscription) = request.subscription {
            location = location.with_subscription(subscription.into_subscription()?);
        }

        let location = self.repository.create(user_id, location).await?;
        info!(user_id = %user_id, location_id = %location.id, "Created digital location");

        self.invalidate(user_id, &location.id, &[]).await;

        Ok(location)
    }

    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        request: UpdateDigitalLocationRequest,
    ) -> Result<DigitalLocation, DomainError> {
        let mut location = self
            .repository
            .get(user_id, id)
            .await?
            .ok_or_else(|| not_found(id))?;

        if let Some(name) = request.name {
            require_non_empty("name", &name)?;
            location.name = name.trim().to_string();
        }

        if let Some(is_active) = request.is_active {
            location.is_active = is_active;
        }

        if let Some(url) = request.url {
            location.url = Some(url);
        }

        location.touch();

        let location = self.repository.update(user_id, location).await?;
        info!(user_id = %user_id, location_id = %id, "Updated digital location");

        self.invalidate(user_id, id, &[]).await;

        Ok(location)
    }

    /// Delete a location with its subscription, payments and the games held there
    pub async fn delete(&self, user_id: &str, id: &str) -> Result<bool, DomainError> {
        let game_ids = self.repository.stored_game_ids(user_id, id).await?;

        let deleted = self.repository.delete(user_id, id).await?;

        if deleted {
            info!(user_id = %user_id, location_id = %id, games = game_ids.len(), "Deleted digital location");
            self.invalidate(user_id, id, &game_ids).await;
        }

        Ok(deleted)
    }

    /// Create or replace the subscription of a location
    pub async fn upsert_subscription(
        &self,
        user_id: &str,
        id: &str,
        request: SubscriptionRequest,
    ) -> Result<DigitalLocation, DomainError> {
        let subscription = request.into_subscription()?;

        let location = self
            .repository
            .upsert_subscription(user_id, id, subscription)
            .await?;
        info!(user_id = %user_id, location_id = %id, "Saved subscription");

        self.invalidate(user_id, id, &[]).await;

        Ok(location)
    }

    pub async fn remove_subscription(&self, user_id: &str, id: &str) -> Result<bool, DomainError> {
        let removed = self.repository.remove_subscription(user_id, id).await?;

        if removed {
            info!(user_id = %user_id, location_id = %id, "Removed subscription");
            self.invalidate(user_id, id, &[]).await;
        }

        Ok(removed)
    }

    pub async fn record_payment(
        &self,
        user_id: &str,
        id: &str,
        request: RecordPaymentRequest,
    ) -> Result<Payment, DomainError> {
        require_amount("amount", request.amount)?;

        let mut payment = Payment::new(request.amount, request.payment_date);
        if let Some(method) = request.payment_method {
            payment = payment.with_payment_method(method);
        }
        if let Some(transaction_id) = request.transaction_id {
            payment = payment.with_transaction_id(transaction_id);
        }

        let payment = self.repository.add_payment(user_id, id, payment).await?;
        info!(user_id = %user_id, location_id = %id, amount = payment.amount, "Recorded payment");

        self.invalidate(user_id, id, &[]).await;

        Ok(payment)
    }

    async fn invalidate(&self, user_id: &str, id: &str, game_ids: &[i64]) {
        let mut own = InvalidationPlan::new();
        digital_keys(&mut own, user_id, id);

        let mut cascade = InvalidationPlan::new();
        cascade.push(DIGITAL.collection_key(user_id));
        library_keys(&mut cascade, user_id);
        library_item_keys(&mut cascade, user_id, game_ids);
        dashboard_key(&mut cascade, user_id);

        run_cascade(&self.invalidator, user_id, &[own, cascade]).await;
    }
}

fn not_found(id: &str) -> DomainError {
    DomainError::not_found(format!("Digital location '{}' not found", id))
}

//! Best-effort invalidation of derived cache entries
//!
//! A write that has committed to the database must not fail because the
//! cache could not be cleared. Failures here are expected to happen now and
//! then, are logged and counted, and are otherwise ignored: stale entries
//! expire with their TTL.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::cache::Cache;
use crate::infrastructure::observability::record_invalidation_failure;

use super::entity_cache::clear_key;
use super::factory::InvalidationMode;

/// Ordered list of keys a write touches
///
/// Keys are kept in insertion order and added at most once per plan.
#[derive(Debug, Clone, Default)]
pub struct InvalidationPlan {
    keys: Vec<String>,
    seen: HashSet<String>,
}

impl InvalidationPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.push(key);
        self
    }

    pub fn push(&mut self, key: impl Into<String>) {
        let key = key.into();

        if self.seen.insert(key.clone()) {
            self.keys.push(key);
        }
    }

    pub fn extend<I, K>(&mut self, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        for key in keys {
            self.push(key);
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Result of a best-effort invalidation pass
///
/// Callers may drop this; it exists so failures are visible in tests and logs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use = "inspect or explicitly ignore the outcome"]
pub struct InvalidationOutcome {
    pub attempted: usize,
    /// Keys that could not be cleared
    pub failures: Vec<String>,
}

impl InvalidationOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn merge(mut self, other: InvalidationOutcome) -> Self {
        self.attempted += other.attempted;
        self.failures.extend(other.failures);
        self
    }
}

/// Clears every key of a plan, continuing past failures
#[derive(Debug, Clone)]
pub struct CacheInvalidator {
    cache: Arc<dyn Cache>,
    mode: InvalidationMode,
    ttl: Duration,
}

impl CacheInvalidator {
    pub fn new(cache: Arc<dyn Cache>, mode: InvalidationMode, ttl: Duration) -> Self {
        Self { cache, mode, ttl }
    }

    pub async fn invalidate(&self, plan: &InvalidationPlan) -> InvalidationOutcome {
        let mut outcome = InvalidationOutcome {
            attempted: plan.len(),
            failures: Vec::new(),
        };

        for key in plan.keys() {
            if let Err(e) = clear_key(self.cache.as_ref(), self.mode, self.ttl, key).await {
                warn!(key = %key, error = %e, "Failed to invalidate cache key");
                outcome.failures.push(key.clone());
            }
        }

        if outcome.is_complete() {
            debug!(keys = outcome.attempted, "Invalidated cache keys");
        } else {
            record_invalidation_failure(outcome.failures.len());
        }

        outcome
    }

    /// Runs each plan in turn; a key present in several plans is cleared each time
    pub async fn invalidate_each(&self, plans: &[InvalidationPlan]) -> InvalidationOutcome {
        let mut outcome = InvalidationOutcome::default();

        for plan in plans {
            outcome = outcome.merge(self.invalidate(plan).await);
        }

        outcome
    }
}

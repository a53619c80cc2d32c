//! Subscription cost normalization

use crate::domain::digital::BillingCycle;

/// Normalizes a per-cycle cost to a monthly figure
///
/// Unrecognized or empty cycle labels yield 0.0 instead of an error: the
/// response always carries a monthly cost, even for malformed subscriptions.
pub fn monthly_cost(billing_cycle: &str, cost_per_cycle: f64) -> f64 {
    match BillingCycle::parse(billing_cycle) {
        Some(cycle) => cost_per_cycle / f64::from(cycle.months()),
        None => 0.0,
    }
}

/// Monthly cost for optional subscription columns
pub fn monthly_cost_of(billing_cycle: Option<&str>, cost_per_cycle: Option<f64>) -> f64 {
    monthly_cost(billing_cycle.unwrap_or_default(), cost_per_cycle.unwrap_or_default())
}

//! Digital location, subscription and payment entities

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::billing::BillingCycle;
use crate::domain::cache::CacheableEntity;

/// Recurring subscription attached to a digital location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Billing cycle label ("1 month", "3 month", "6 month", "12 month")
    pub billing_cycle: String,
    pub cost_per_cycle: f64,
    /// Date of the first payment; later payments fall on whole cycles from it
    pub anchor_date: NaiveDate,
    pub payment_method: String,
}

impl Subscription {
    pub fn new(cycle: BillingCycle, cost_per_cycle: f64, anchor_date: NaiveDate) -> Self {
        Self {
            billing_cycle: cycle.label().to_string(),
            cost_per_cycle,
            anchor_date,
            payment_method: String::new(),
        }
    }

    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = method.into();
        self
    }

    pub fn cycle(&self) -> Option<BillingCycle> {
        BillingCycle::parse(&self.billing_cycle)
    }

    /// First payment date on or after `today`, `None` for unknown cycles
    pub fn next_payment_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        let months = self.cycle()?.months();

        if self.anchor_date >= today {
            return Some(self.anchor_date);
        }

        let elapsed = months_between(self.anchor_date, today);
        let mut periods = elapsed / months;

        loop {
            let candidate = self
                .anchor_date
                .checked_add_months(Months::new(periods * months))?;

            if candidate >= today {
                return Some(candidate);
            }

            periods += 1;
        }
    }
}

fn months_between(from: NaiveDate, to: NaiveDate) -> u32 {
    use chrono::Datelike;

    let months = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    months.max(0) as u32
}

/// A recorded subscription payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub amount: f64,
    pub payment_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

impl Payment {
    pub fn new(amount: f64, payment_date: NaiveDate) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            amount,
            payment_date,
            payment_method: None,
            transaction_id: None,
        }
    }

    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = Some(method.into());
        self
    }

    pub fn with_transaction_id(mut self, id: impl Into<String>) -> Self {
        self.transaction_id = Some(id.into());
        self
    }
}

/// A storefront or subscription account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitalLocation {
    pub id: String,
    pub name: String,
    pub is_subscription: bool,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription: Option<Subscription>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    /// Number of games held here
    #[serde(default)]
    pub stored_items: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DigitalLocation {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            is_subscription: false,
            is_active: true,
            url: None,
            subscription: None,
            payments: Vec::new(),
            stored_items: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Attach a subscription, marking the location as subscription-based
    pub fn with_subscription(mut self, subscription: Subscription) -> Self {
        self.is_subscription = true;
        self.subscription = Some(subscription);
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl CacheableEntity for DigitalLocation {
    fn cache_id(&self) -> String {
        self.id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_next_payment_date_rolls_forward_whole_cycles() {
        let sub = Subscription::new(BillingCycle::Quarterly, 30.0, date(2026, 1, 15));

        assert_eq!(sub.next_payment_date(date(2026, 1, 10)), Some(date(2026, 1, 15)));
        assert_eq!(sub.next_payment_date(date(2026, 1, 15)), Some(date(2026, 1, 15)));
        assert_eq!(sub.next_payment_date(date(2026, 1, 16)), Some(date(2026, 4, 15)));
        assert_eq!(sub.next_payment_date(date(2026, 10, 15)), Some(date(2026, 10, 15)));
        assert_eq!(sub.next_payment_date(date(2026, 10, 16)), Some(date(2027, 1, 15)));
    }

    #[test]
    fn test_next_payment_date_unknown_cycle() {
        let mut sub = Subscription::new(BillingCycle::Monthly, 10.0, date(2026, 1, 1));
        sub.billing_cycle = "fortnightly".to_string();

        assert_eq!(sub.next_payment_date(date(2026, 3, 1)), None);
    }

    #[test]
    fn test_with_subscription_marks_location() {
        let location = DigitalLocation::new("Game Pass").with_subscription(Subscription::new(
            BillingCycle::Monthly,
            15.0,
            date(2026, 1, 1),
        ));

        assert!(location.is_subscription);
        assert_eq!(
            location.subscription.as_ref().and_then(Subscription::cycle),
            Some(BillingCycle::Monthly)
        );
    }
}

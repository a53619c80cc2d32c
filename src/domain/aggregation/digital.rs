//! Digital locations BFF aggregation

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::cost::monthly_cost;
use super::grouping::{push_platform_version, OrderedGroups, PlatformVersion};
use super::physical::StoredGameView;
use super::rows::DigitalLocationRow;
use crate::domain::digital::Subscription;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitalBffResponse {
    pub digital_locations: Vec<DigitalLocationView>,
    /// Sum of the monthly cost of every active subscription
    pub total_monthly_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitalLocationView {
    pub id: String,
    pub name: String,
    pub is_subscription: bool,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription: Option<SubscriptionView>,
    pub stored_items: usize,
    pub items: Vec<StoredGameView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionView {
    pub billing_cycle: String,
    pub cost_per_cycle: f64,
    pub monthly_cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_payment_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

impl SubscriptionView {
    fn from_row(row: &DigitalLocationRow, today: NaiveDate) -> Option<Self> {
        if !row.is_subscription {
            return None;
        }

        let billing_cycle = row.billing_cycle.clone().unwrap_or_default();
        let cost_per_cycle = row.cost_per_cycle.unwrap_or_default();

        let next_payment_date = row.anchor_date.and_then(|anchor_date| {
            Subscription {
                billing_cycle: billing_cycle.clone(),
                cost_per_cycle,
                anchor_date,
                payment_method: String::new(),
            }
            .next_payment_date(today)
        });

        Some(Self {
            monthly_cost: monthly_cost(&billing_cycle, cost_per_cycle),
            billing_cycle,
            cost_per_cycle,
            next_payment_date,
            payment_method: row.payment_method.clone().filter(|m| !m.is_empty()),
        })
    }
}

struct LocationBuilder {
    view: DigitalLocationView,
    items: OrderedGroups<i64, StoredGameView>,
}

/// Builds the digital locations view from flat rows
pub fn build_digital_bff(rows: &[DigitalLocationRow], now: DateTime<Utc>) -> DigitalBffResponse {
    let today = now.date_naive();
    let mut locations: OrderedGroups<String, LocationBuilder> = OrderedGroups::new();

    for row in rows {
        let location = locations.get_or_insert_with(row.location_id.clone(), || LocationBuilder {
            view: DigitalLocationView {
                id: row.location_id.clone(),
                name: row.location_name.clone(),
                is_subscription: row.is_subscription,
                is_active: row.is_active,
                url: row.url.clone(),
                subscription: SubscriptionView::from_row(row, today),
                stored_items: 0,
                items: Vec::new(),
            },
            items: OrderedGroups::new(),
        });

        let (Some(game_id), Some(game_name)) = (row.game_id, row.game_name.as_ref()) else {
            continue;
        };

        let item = location.items.get_or_insert_with(game_id, || StoredGameView {
            id: game_id,
            name: game_name.clone(),
            platform_versions: Vec::new(),
        });

        if let (Some(platform_id), Some(platform_name)) = (row.platform_id, row.platform_name.as_ref()) {
            push_platform_version(&mut item.platform_versions, platform_id, platform_name);
        }
    }

    let digital_locations: Vec<DigitalLocationView> = locations
        .into_values()
        .into_iter()
        .map(|location| {
            let items = location.items.into_values();
            DigitalLocationView {
                stored_items: items.len(),
                items,
                ..location.view
            }
        })
        .collect();

    let total_monthly_cost = digital_locations
        .iter()
        .filter(|location| location.is_active)
        .filter_map(|location| location.subscription.as_ref())
        .fold(0.0, |total, subscription| total + subscription.monthly_cost);

    DigitalBffResponse {
        digital_locations,
        total_monthly_cost,
    }
}

//! Flat, already-joined rows handed to the aggregation engine
//!
//! Location columns are optional because they come from LEFT JOINs: a row whose
//! location columns are missing references a location that is not in the
//! result set and is treated as an orphan.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One row per game in the library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRow {
    pub game_id: i64,
    pub name: String,
    pub cover_url: Option<String>,
    pub first_release_date: Option<i64>,
    pub rating: Option<f64>,
    pub themes: Vec<String>,
    pub is_favorite: bool,
    pub is_in_wishlist: bool,
    pub game_type_display: String,
    pub game_type_normalized: String,
    pub created_at: DateTime<Utc>,
}

/// game × platform × sublocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalPlacementRow {
    pub game_id: i64,
    pub platform_id: i64,
    pub platform_name: String,
    pub parent_location_id: Option<String>,
    pub parent_location_name: Option<String>,
    pub parent_location_type: Option<String>,
    pub sublocation_id: Option<String>,
    pub sublocation_name: Option<String>,
    pub sublocation_type: Option<String>,
}

/// game × platform × digital location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitalPlacementRow {
    pub game_id: i64,
    pub platform_id: i64,
    pub platform_name: String,
    pub digital_location_id: Option<String>,
    pub digital_location_name: Option<String>,
    pub is_subscription: bool,
    pub is_active: bool,
    pub billing_cycle: Option<String>,
    pub cost_per_cycle: Option<f64>,
}

/// Everything the library view is built from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryRowSet {
    pub games: Vec<GameRow>,
    pub physical: Vec<PhysicalPlacementRow>,
    pub digital: Vec<DigitalPlacementRow>,
}

/// physical location × sublocation × game × platform
///
/// A location without sublocations yields one row with empty sublocation
/// columns; a sublocation without games yields one row with empty game columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalLocationRow {
    pub location_id: String,
    pub location_name: String,
    pub location_type: String,
    pub map_coordinates: Option<String>,
    pub sublocation_id: Option<String>,
    pub sublocation_name: Option<String>,
    pub sublocation_type: Option<String>,
    pub bg_color: Option<String>,
    pub game_id: Option<i64>,
    pub game_name: Option<String>,
    pub platform_id: Option<i64>,
    pub platform_name: Option<String>,
}

/// digital location × subscription × game × platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitalLocationRow {
    pub location_id: String,
    pub location_name: String,
    pub is_subscription: bool,
    pub is_active: bool,
    pub url: Option<String>,
    pub billing_cycle: Option<String>,
    pub cost_per_cycle: Option<f64>,
    pub anchor_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
    pub game_id: Option<i64>,
    pub game_name: Option<String>,
    pub platform_id: Option<i64>,
    pub platform_name: Option<String>,
}

/// Per-location summary used by the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitalLocationSummaryRow {
    pub location_id: String,
    pub location_name: String,
    pub is_subscription: bool,
    pub is_active: bool,
    pub billing_cycle: Option<String>,
    pub cost_per_cycle: Option<f64>,
}

/// Everything the dashboard statistics are derived from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardRowSet {
    pub library: LibraryRowSet,
    pub physical_location_count: usize,
    pub sublocation_count: usize,
    pub digital_locations: Vec<DigitalLocationSummaryRow>,
}

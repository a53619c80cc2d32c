//! Library BFF aggregation
//!
//! Reshapes flat game × platform × location rows into one item per game with
//! its physical locations grouped by `(parentLocationId, sublocationId)` and its
//! digital locations grouped by `digitalLocationId`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::cost::monthly_cost_of;
use super::grouping::{push_platform_version, OrderedGroups, PlatformVersion};
use super::recent::RecentlyAddedWindow;
use super::rows::{DigitalPlacementRow, GameRow, LibraryRowSet, PhysicalPlacementRow};
use crate::domain::library::GameType;

/// Top-level library view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryBffResponse {
    pub library_items: Vec<LibraryBffItem>,
    pub recently_added: Vec<LibraryBffItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryBffItem {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_release_date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    pub themes: Vec<String>,
    pub is_favorite: bool,
    pub is_in_wishlist: bool,
    pub game_type: GameType,
    pub created_at: DateTime<Utc>,
    pub physical_locations: Vec<PhysicalLocationGroup>,
    pub digital_locations: Vec<DigitalLocationGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalLocationGroup {
    pub parent_location_name: String,
    pub parent_location_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_location_type: Option<String>,
    pub sublocation_name: String,
    pub sublocation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sublocation_type: Option<String>,
    pub platform_versions: Vec<PlatformVersion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitalLocationGroup {
    pub digital_location_name: String,
    pub digital_location_id: String,
    pub is_subscription: bool,
    pub is_active: bool,
    pub monthly_cost: f64,
    pub platform_versions: Vec<PlatformVersion>,
}

struct ItemBuilder {
    game: GameRow,
    physical: OrderedGroups<(String, String), PhysicalLocationGroup>,
    digital: OrderedGroups<String, DigitalLocationGroup>,
}

impl ItemBuilder {
    fn new(game: &GameRow) -> Self {
        Self {
            game: game.clone(),
            physical: OrderedGroups::new(),
            digital: OrderedGroups::new(),
        }
    }

    fn add_physical(&mut self, row: &PhysicalPlacementRow) {
        let (Some(parent_id), Some(parent_name), Some(sub_id), Some(sub_name)) = (
            row.parent_location_id.as_ref(),
            row.parent_location_name.as_ref(),
            row.sublocation_id.as_ref(),
            row.sublocation_name.as_ref(),
        ) else {
            warn!(
                game_id = row.game_id,
                sublocation_id = ?row.sublocation_id,
                "Dropping physical placement without a matching location"
            );
            return;
        };

        let group = self
            .physical
            .get_or_insert_with((parent_id.clone(), sub_id.clone()), || PhysicalLocationGroup {
                parent_location_name: parent_name.clone(),
                parent_location_id: parent_id.clone(),
                parent_location_type: row.parent_location_type.clone(),
                sublocation_name: sub_name.clone(),
                sublocation_id: sub_id.clone(),
                sublocation_type: row.sublocation_type.clone(),
                platform_versions: Vec::new(),
            });

        push_platform_version(&mut group.platform_versions, row.platform_id, &row.platform_name);
    }

    fn add_digital(&mut self, row: &DigitalPlacementRow) {
        let (Some(location_id), Some(location_name)) =
            (row.digital_location_id.as_ref(), row.digital_location_name.as_ref())
        else {
            warn!(
                game_id = row.game_id,
                digital_location_id = ?row.digital_location_id,
                "Dropping digital placement without a matching location"
            );
            return;
        };

        let group = self
            .digital
            .get_or_insert_with(location_id.clone(), || DigitalLocationGroup {
                digital_location_name: location_name.clone(),
                digital_location_id: location_id.clone(),
                is_subscription: row.is_subscription,
                is_active: row.is_active,
                monthly_cost: if row.is_subscription {
                    monthly_cost_of(row.billing_cycle.as_deref(), row.cost_per_cycle)
                } else {
                    0.0
                },
                platform_versions: Vec::new(),
            });

        push_platform_version(&mut group.platform_versions, row.platform_id, &row.platform_name);
    }

    fn build(self) -> LibraryBffItem {
        let game = self.game;

        LibraryBffItem {
            id: game.game_id,
            name: game.name,
            cover_url: game.cover_url,
            first_release_date: game.first_release_date,
            rating: game.rating,
            themes: game.themes,
            is_favorite: game.is_favorite,
            is_in_wishlist: game.is_in_wishlist,
            game_type: GameType::new(game.game_type_display, game.game_type_normalized),
            created_at: game.created_at,
            physical_locations: self.physical.into_values(),
            digital_locations: self.digital.into_values(),
        }
    }
}

/// Builds the library view from one user's rows
///
/// Items keep the order of `rows.games`; location groups keep the order in
/// which their first row appeared.
pub fn build_library_bff(rows: &LibraryRowSet, now: DateTime<Utc>) -> LibraryBffResponse {
    let window = RecentlyAddedWindow::ending_at(now);
    let mut items: OrderedGroups<i64, ItemBuilder> = OrderedGroups::new();

    for game in &rows.games {
        items.get_or_insert_with(game.game_id, || ItemBuilder::new(game));
    }

    for row in &rows.physical {
        match items.get_mut(&row.game_id) {
            Some(item) => item.add_physical(row),
            None => warn!(game_id = row.game_id, "Dropping physical placement for unknown game"),
        }
    }

    for row in &rows.digital {
        match items.get_mut(&row.game_id) {
            Some(item) => item.add_digital(row),
            None => warn!(game_id = row.game_id, "Dropping digital placement for unknown game"),
        }
    }

    let library_items: Vec<LibraryBffItem> =
        items.into_values().into_iter().map(ItemBuilder::build).collect();

    let recently_added = library_items
        .iter()
        .filter(|item| window.contains(item.created_at))
        .cloned()
        .collect();

    LibraryBffResponse {
        library_items,
        recently_added,
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::collections::{BTreeMap, BTreeSet};

    const SWITCH: (i64, &str) = (130, "Nintendo Switch");
    const PS5: (i64, &str) = (167, "PlayStation 5");

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_end_to_end_physical_and_subscription() {
        let rows = LibraryRowSet {
            games: vec![game(7, "Hollow Knight", now() - Duration::days(400))],
            physical: vec![physical(7, SWITCH, ("p1", "Living Room"), ("s1", "Top Shelf"))],
            digital: vec![digital(7, SWITCH, ("d1", "Game Pass"), Some(("3 month", 30.0)))],
        };

        let response = build_library_bff(&rows, now());

        assert_eq!(response.library_items.len(), 1);
        let item = &response.library_items[0];
        assert_eq!(item.id, 7);

        assert_eq!(item.physical_locations.len(), 1);
        assert_eq!(item.physical_locations[0].parent_location_id, "p1");
        assert_eq!(item.physical_locations[0].sublocation_id, "s1");

        assert_eq!(item.digital_locations.len(), 1);
        assert_eq!(item.digital_locations[0].digital_location_id, "d1");
        assert_eq!(item.digital_locations[0].monthly_cost, 10.0);

        assert!(response.recently_added.is_empty());
    }

    #[test]
    fn test_platform_versions_grouped_per_location() {
        let rows = LibraryRowSet {
            games: vec![game(7, "Hollow Knight", now())],
            physical: vec![
                physical(7, SWITCH, ("p1", "Living Room"), ("s1", "Top Shelf")),
                physical(7, PS5, ("p1", "Living Room"), ("s1", "Top Shelf")),
                physical(7, SWITCH, ("p1", "Living Room"), ("s1", "Top Shelf")),
                physical(7, PS5, ("p1", "Living Room"), ("s2", "Bottom Shelf")),
            ],
            digital: Vec::new(),
        };

        let response = build_library_bff(&rows, now());
        let groups = &response.library_items[0].physical_locations;

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].sublocation_id, "s1");
        assert_eq!(groups[0].platform_versions.len(), 2);
        assert_eq!(groups[1].sublocation_id, "s2");
        assert_eq!(groups[1].platform_versions.len(), 1);
    }

    #[test]
    fn test_same_sublocation_id_under_different_parents_is_two_groups() {
        let rows = LibraryRowSet {
            games: vec![game(7, "Hollow Knight", now())],
            physical: vec![
                physical(7, SWITCH, ("p1", "Living Room"), ("s1", "Shelf")),
                physical(7, SWITCH, ("p2", "Office"), ("s1", "Shelf")),
            ],
            digital: Vec::new(),
        };

        let response = build_library_bff(&rows, now());
        assert_eq!(response.library_items[0].physical_locations.len(), 2);
    }

    #[test]
    fn test_recently_added_boundary() {
        let cutoff = RecentlyAddedWindow::ending_at(now()).cutoff();
        let rows = LibraryRowSet {
            games: vec![
                game(1, "Old", cutoff - Duration::seconds(1)),
                game(2, "New", now() - Duration::days(1)),
            ],
            ..Default::default()
        };

        let response = build_library_bff(&rows, now());

        assert_eq!(response.library_items.len(), 2);
        let recent: Vec<i64> = response.recently_added.iter().map(|i| i.id).collect();
        assert_eq!(recent, vec![2]);
    }

    #[test]
    fn test_orphan_rows_are_dropped() {
        let mut orphan_location = physical(7, SWITCH, ("p1", "Living Room"), ("s1", "Top Shelf"));
        orphan_location.sublocation_name = None;

        let mut orphan_digital = digital(7, SWITCH, ("d1", "Steam"), None);
        orphan_digital.digital_location_name = None;

        let rows = LibraryRowSet {
            games: vec![game(7, "Hollow Knight", now())],
            physical: vec![
                orphan_location,
                physical(99, SWITCH, ("p1", "Living Room"), ("s1", "Top Shelf")),
            ],
            digital: vec![orphan_digital, digital(7, PS5, ("d2", "PSN"), None)],
        };

        let response = build_library_bff(&rows, now());

        assert_eq!(response.library_items.len(), 1);
        let item = &response.library_items[0];
        assert!(item.physical_locations.is_empty());
        assert_eq!(item.digital_locations.len(), 1);
        assert_eq!(item.digital_locations[0].digital_location_id, "d2");
        assert_eq!(item.digital_locations[0].monthly_cost, 0.0);
    }

    #[test]
    fn test_unknown_billing_cycle_costs_nothing() {
        let rows = LibraryRowSet {
            games: vec![game(7, "Halo", now())],
            digital: vec![digital(7, PS5, ("d1", "Service"), Some(("", 50.0)))],
            ..Default::default()
        };

        let response = build_library_bff(&rows, now());
        assert_eq!(response.library_items[0].digital_locations[0].monthly_cost, 0.0);
    }

    #[test]
    fn test_grouping_is_independent_of_row_order() {
        let games = vec![game(1, "A", now()), game(2, "B", now())];
        let physical_rows = vec![
            physical(1, SWITCH, ("p1", "Room"), ("s1", "Shelf 1")),
            physical(1, PS5, ("p1", "Room"), ("s1", "Shelf 1")),
            physical(2, PS5, ("p1", "Room"), ("s2", "Shelf 2")),
            physical(1, PS5, ("p2", "Office"), ("s3", "Desk")),
        ];
        let digital_rows = vec![
            digital(1, SWITCH, ("d1", "eShop"), None),
            digital(2, PS5, ("d2", "PS Plus"), Some(("1 month", 10.0))),
            digital(2, SWITCH, ("d2", "PS Plus"), Some(("1 month", 10.0))),
        ];

        let forward = LibraryRowSet {
            games: games.clone(),
            physical: physical_rows.clone(),
            digital: digital_rows.clone(),
        };
        let reversed = LibraryRowSet {
            games: games.into_iter().rev().collect(),
            physical: physical_rows.into_iter().rev().collect(),
            digital: digital_rows.into_iter().rev().collect(),
        };

        assert_eq!(
            membership(&build_library_bff(&forward, now())),
            membership(&build_library_bff(&reversed, now()))
        );
    }

    type Membership = BTreeMap<(i64, String), BTreeSet<i64>>;

    fn membership(response: &LibraryBffResponse) -> Membership {
        let mut groups = Membership::new();

        for item in &response.library_items {
            for group in &item.physical_locations {
                let key = (item.id, format!("{}/{}", group.parent_location_id, group.sublocation_id));
                groups
                    .entry(key)
                    .or_default()
                    .extend(group.platform_versions.iter().map(|v| v.platform_id));
            }

            for group in &item.digital_locations {
                let key = (item.id, group.digital_location_id.clone());
                groups
                    .entry(key)
                    .or_default()
                    .extend(group.platform_versions.iter().map(|v| v.platform_id));
            }
        }

        groups
    }

    #[test]
    fn test_serialized_shape() {
        let rows = LibraryRowSet {
            games: vec![game(7, "Hollow Knight", now())],
            physical: vec![physical(7, SWITCH, ("p1", "Living Room"), ("s1", "Top Shelf"))],
            digital: Vec::new(),
        };

        let json = serde_json::to_value(build_library_bff(&rows, now())).unwrap();
        let location = &json["libraryItems"][0]["physicalLocations"][0];

        assert_eq!(location["parentLocationName"], "Living Room");
        assert_eq!(location["sublocationId"], "s1");
        assert_eq!(location["platformVersions"][0]["platformName"], "Nintendo Switch");
        assert_eq!(location["platformVersions"][0]["platformId"], 130);
        assert!(json["recentlyAdded"].is_array());
    }
}

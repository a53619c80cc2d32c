//! Dashboard statistics

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cost::monthly_cost_of;
use super::recent::RecentlyAddedWindow;
use super::rows::DashboardRowSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_games: usize,
    pub favorite_games: usize,
    pub wishlist_games: usize,
    pub recently_added_games: usize,
    /// Distinct (game, platform, sublocation) copies
    pub physical_copies: usize,
    /// Distinct (game, platform, digital location) copies
    pub digital_copies: usize,
    pub platform_distribution: Vec<PlatformCount>,
    pub physical_location_count: usize,
    pub sublocation_count: usize,
    pub digital_location_count: usize,
    pub active_subscriptions: usize,
    pub monthly_subscription_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformCount {
    pub platform_id: i64,
    pub platform_name: String,
    /// Number of distinct games held on this platform
    pub game_count: usize,
}

pub fn build_dashboard(input: &DashboardRowSet, now: DateTime<Utc>) -> DashboardStats {
    let window = RecentlyAddedWindow::ending_at(now);
    let library = &input.library;

    let known_games: HashSet<i64> = library.games.iter().map(|g| g.game_id).collect();

    let physical_copies: HashSet<(i64, i64, &str)> = library
        .physical
        .iter()
        .filter(|row| known_games.contains(&row.game_id))
        .filter_map(|row| Some((row.game_id, row.platform_id, row.sublocation_id.as_deref()?)))
        .collect();

    let digital_copies: HashSet<(i64, i64, &str)> = library
        .digital
        .iter()
        .filter(|row| known_games.contains(&row.game_id))
        .filter_map(|row| Some((row.game_id, row.platform_id, row.digital_location_id.as_deref()?)))
        .collect();

    let mut platforms: HashMap<i64, (String, HashSet<i64>)> = HashMap::new();
    let placements = library
        .physical
        .iter()
        .map(|row| (row.game_id, row.platform_id, &row.platform_name))
        .chain(
            library
                .digital
                .iter()
                .map(|row| (row.game_id, row.platform_id, &row.platform_name)),
        );

    for (game_id, platform_id, platform_name) in placements {
        if !known_games.contains(&game_id) {
            continue;
        }

        platforms
            .entry(platform_id)
            .or_insert_with(|| (platform_name.clone(), HashSet::new()))
            .1
            .insert(game_id);
    }

    let mut platform_distribution: Vec<PlatformCount> = platforms
        .into_iter()
        .map(|(platform_id, (platform_name, games))| PlatformCount {
            platform_id,
            platform_name,
            game_count: games.len(),
        })
        .collect();

    platform_distribution.sort_by(|a, b| {
        b.game_count
            .cmp(&a.game_count)
            .then_with(|| a.platform_name.cmp(&b.platform_name))
    });

    let active_subscriptions: Vec<_> = input
        .digital_locations
        .iter()
        .filter(|location| location.is_subscription && location.is_active)
        .collect();

    DashboardStats {
        total_games: library.games.len(),
        favorite_games: library.games.iter().filter(|g| g.is_favorite).count(),
        wishlist_games: library.games.iter().filter(|g| g.is_in_wishlist).count(),
        recently_added_games: library
            .games
            .iter()
            .filter(|g| window.contains(g.created_at))
            .count(),
        physical_copies: physical_copies.len(),
        digital_copies: digital_copies.len(),
        platform_distribution,
        physical_location_count: input.physical_location_count,
        sublocation_count: input.sublocation_count,
        digital_location_count: input.digital_locations.len(),
        active_subscriptions: active_subscriptions.len(),
        monthly_subscription_cost: active_subscriptions
            .iter()
            .fold(0.0, |total, location| {
                total + monthly_cost_of(location.billing_cycle.as_deref(), location.cost_per_cycle)
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregation::library::fixtures::{digital, game, physical};
    use crate::domain::aggregation::rows::{DigitalLocationSummaryRow, LibraryRowSet};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap()
    }

    fn summary(id: &str, cycle: Option<(&str, f64)>, active: bool) -> DigitalLocationSummaryRow {
        DigitalLocationSummaryRow {
            location_id: id.to_string(),
            location_name: id.to_string(),
            is_subscription: cycle.is_some(),
            is_active: active,
            billing_cycle: cycle.map(|c| c.0.to_string()),
            cost_per_cycle: cycle.map(|c| c.1),
        }
    }

    #[test]
    fn test_dashboard_counts() {
        let mut favorite = game(1, "Zelda", now() - Duration::days(2));
        favorite.is_favorite = true;
        let mut wished = game(2, "Metroid", now() - Duration::days(800));
        wished.is_in_wishlist = true;

        let input = DashboardRowSet {
            library: LibraryRowSet {
                games: vec![favorite, wished, game(3, "Hades", now() - Duration::days(30))],
                physical: vec![
                    physical(1, (130, "Switch"), ("p1", "Room"), ("s1", "Shelf")),
                    physical(1, (130, "Switch"), ("p1", "Room"), ("s1", "Shelf")),
                    physical(2, (130, "Switch"), ("p1", "Room"), ("s2", "Drawer")),
                    physical(42, (130, "Switch"), ("p1", "Room"), ("s2", "Drawer")),
                ],
                digital: vec![
                    digital(3, (6, "PC"), ("steam", "Steam"), None),
                    digital(1, (6, "PC"), ("gp", "Game Pass"), Some(("3 month", 30.0))),
                ],
            },
            physical_location_count: 1,
            sublocation_count: 2,
            digital_locations: vec![
                summary("steam", None, true),
                summary("gp", Some(("3 month", 30.0)), true),
                summary("old", Some(("1 month", 15.0)), false),
            ],
        };

        let stats = build_dashboard(&input, now());

        assert_eq!(stats.total_games, 3);
        assert_eq!(stats.favorite_games, 1);
        assert_eq!(stats.wishlist_games, 1);
        assert_eq!(stats.recently_added_games, 2);
        assert_eq!(stats.physical_copies, 2);
        assert_eq!(stats.digital_copies, 2);
        assert_eq!(stats.digital_location_count, 3);
        assert_eq!(stats.active_subscriptions, 1);
        assert_eq!(stats.monthly_subscription_cost, 10.0);
    }

    #[test]
    fn test_platform_distribution_ordering() {
        let input = DashboardRowSet {
            library: LibraryRowSet {
                games: vec![game(1, "A", now()), game(2, "B", now()), game(3, "C", now())],
                physical: vec![
                    physical(1, (167, "PS5"), ("p1", "Room"), ("s1", "Shelf")),
                    physical(2, (130, "Switch"), ("p1", "Room"), ("s1", "Shelf")),
                ],
                digital: vec![
                    digital(3, (6, "PC"), ("steam", "Steam"), None),
                    digital(1, (6, "PC"), ("steam", "Steam"), None),
                ],
            },
            ..Default::default()
        };

        let stats = build_dashboard(&input, now());
        let names: Vec<&str> = stats
            .platform_distribution
            .iter()
            .map(|p| p.platform_name.as_str())
            .collect();

        assert_eq!(names, vec!["PC", "PS5", "Switch"]);
        assert_eq!(stats.platform_distribution[0].game_count, 2);
    }

    #[test]
    fn test_empty_collection() {
        let stats = build_dashboard(&DashboardRowSet::default(), now());
        assert_eq!(stats, DashboardStats::default());
    }
}

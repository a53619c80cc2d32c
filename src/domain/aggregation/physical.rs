//! Physical locations BFF aggregation

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::grouping::{push_platform_version, OrderedGroups, PlatformVersion};
use super::rows::PhysicalLocationRow;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalBffResponse {
    pub physical_locations: Vec<PhysicalLocationView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalLocationView {
    pub id: String,
    pub name: String,
    pub location_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_coordinates: Option<String>,
    pub sublocations: Vec<SublocationView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SublocationView {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
    pub stored_items: usize,
    pub items: Vec<StoredGameView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredGameView {
    pub id: i64,
    pub name: String,
    pub platform_versions: Vec<PlatformVersion>,
}

struct LocationBuilder {
    view: PhysicalLocationView,
    sublocations: OrderedGroups<String, SublocationBuilder>,
}

struct SublocationBuilder {
    view: SublocationView,
    items: OrderedGroups<i64, StoredGameView>,
}

impl SublocationBuilder {
    fn build(self) -> SublocationView {
        let items = self.items.into_values();

        SublocationView {
            stored_items: items.len(),
            items,
            ..self.view
        }
    }
}

/// Builds physical location → sublocation → game nesting from flat rows
pub fn build_physical_bff(rows: &[PhysicalLocationRow]) -> PhysicalBffResponse {
    let mut locations: OrderedGroups<String, LocationBuilder> = OrderedGroups::new();

    for row in rows {
        let location = locations.get_or_insert_with(row.location_id.clone(), || LocationBuilder {
            view: PhysicalLocationView {
                id: row.location_id.clone(),
                name: row.location_name.clone(),
                location_type: row.location_type.clone(),
                map_coordinates: row.map_coordinates.clone(),
                sublocations: Vec::new(),
            },
            sublocations: OrderedGroups::new(),
        });

        let Some(sublocation_id) = row.sublocation_id.as_ref() else {
            continue;
        };

        let Some(sublocation_name) = row.sublocation_name.as_ref() else {
            warn!(
                location_id = %row.location_id,
                sublocation_id = %sublocation_id,
                "Dropping physical row with an unknown sublocation"
            );
            continue;
        };

        let sublocation = location
            .sublocations
            .get_or_insert_with(sublocation_id.clone(), || SublocationBuilder {
                view: SublocationView {
                    id: sublocation_id.clone(),
                    name: sublocation_name.clone(),
                    location_type: row.sublocation_type.clone(),
                    bg_color: row.bg_color.clone(),
                    stored_items: 0,
                    items: Vec::new(),
                },
                items: OrderedGroups::new(),
            });

        let (Some(game_id), Some(game_name)) = (row.game_id, row.game_name.as_ref()) else {
            continue;
        };

        let item = sublocation.items.get_or_insert_with(game_id, || StoredGameView {
            id: game_id,
            name: game_name.clone(),
            platform_versions: Vec::new(),
        });

        if let (Some(platform_id), Some(platform_name)) = (row.platform_id, row.platform_name.as_ref()) {
            push_platform_version(&mut item.platform_versions, platform_id, platform_name);
        }
    }

    let physical_locations = locations
        .into_values()
        .into_iter()
        .map(|location| PhysicalLocationView {
            sublocations: location
                .sublocations
                .into_values()
                .into_iter()
                .map(SublocationBuilder::build)
                .collect(),
            ..location.view
        })
        .collect();

    PhysicalBffResponse { physical_locations }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(location: &str, sub: Option<&str>, game: Option<(i64, &str)>, platform: Option<(i64, &str)>) -> PhysicalLocationRow {
        PhysicalLocationRow {
            location_id: location.to_string(),
            location_name: format!("{location} name"),
            location_type: "house".to_string(),
            map_coordinates: None,
            sublocation_id: sub.map(str::to_string),
            sublocation_name: sub.map(|s| format!("{s} name")),
            sublocation_type: sub.map(|_| "shelf".to_string()),
            bg_color: None,
            game_id: game.map(|g| g.0),
            game_name: game.map(|g| g.1.to_string()),
            platform_id: platform.map(|p| p.0),
            platform_name: platform.map(|p| p.1.to_string()),
        }
    }

    #[test]
    fn test_nests_locations_sublocations_and_games() {
        let rows = vec![
            row("p1", Some("s1"), Some((7, "Zelda")), Some((130, "Switch"))),
            row("p1", Some("s1"), Some((7, "Zelda")), Some((41, "Wii U"))),
            row("p1", Some("s1"), Some((8, "Metroid")), Some((130, "Switch"))),
            row("p1", Some("s2"), None, None),
            row("p2", None, None, None),
        ];

        let response = build_physical_bff(&rows);

        assert_eq!(response.physical_locations.len(), 2);

        let first = &response.physical_locations[0];
        assert_eq!(first.id, "p1");
        assert_eq!(first.sublocations.len(), 2);
        assert_eq!(first.sublocations[0].stored_items, 2);
        assert_eq!(first.sublocations[0].items[0].platform_versions.len(), 2);
        assert_eq!(first.sublocations[1].stored_items, 0);

        assert!(response.physical_locations[1].sublocations.is_empty());
    }

    #[test]
    fn test_orphan_sublocation_rows_are_dropped() {
        let mut orphan = row("p1", Some("s9"), Some((7, "Zelda")), Some((130, "Switch")));
        orphan.sublocation_name = None;

        let response = build_physical_bff(&[orphan, row("p1", Some("s1"), None, None)]);

        let location = &response.physical_locations[0];
        assert_eq!(location.sublocations.len(), 1);
        assert_eq!(location.sublocations[0].id, "s1");
    }

    #[test]
    fn test_empty_rows() {
        assert!(build_physical_bff(&[]).physical_locations.is_empty());
    }
}

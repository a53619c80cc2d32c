//! Library item entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::cache::CacheableEntity;

/// Gaming platform a copy is held on
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub id: i64,
    pub name: String,
}

impl Platform {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Where a single copy of a game lives
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlacementLocation {
    /// A shelf (sublocation) inside a physical location
    Physical {
        parent_location_id: String,
        sublocation_id: String,
    },
    /// A storefront or subscription account
    Digital { digital_location_id: String },
}

impl PlacementLocation {
    pub fn is_physical(&self) -> bool {
        matches!(self, Self::Physical { .. })
    }
}

/// A (platform, location) pair where the game is actually held
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamePlacement {
    pub platform: Platform,
    pub location: PlacementLocation,
}

impl GamePlacement {
    pub fn physical(
        platform: Platform,
        parent_location_id: impl Into<String>,
        sublocation_id: impl Into<String>,
    ) -> Self {
        Self {
            platform,
            location: PlacementLocation::Physical {
                parent_location_id: parent_location_id.into(),
                sublocation_id: sublocation_id.into(),
            },
        }
    }

    pub fn digital(platform: Platform, digital_location_id: impl Into<String>) -> Self {
        Self {
            platform,
            location: PlacementLocation::Digital {
                digital_location_id: digital_location_id.into(),
            },
        }
    }
}

/// Physical/digital type tag with its display and normalized text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameType {
    pub display_text: String,
    pub normalized_text: String,
}

impl GameType {
    pub fn physical() -> Self {
        Self::new("Physical", "physical")
    }

    pub fn digital() -> Self {
        Self::new("Digital", "digital")
    }

    pub fn new(display_text: impl Into<String>, normalized_text: impl Into<String>) -> Self {
        Self {
            display_text: display_text.into(),
            normalized_text: normalized_text.into(),
        }
    }

    /// Physical as soon as one copy sits on a shelf, digital otherwise
    pub fn for_placements(placements: &[GamePlacement]) -> Self {
        if placements.iter().any(|p| p.location.is_physical()) {
            Self::physical()
        } else {
            Self::digital()
        }
    }
}

/// A game in a user's library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryItem {
    pub game_id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    /// Unix timestamp (seconds) of the first release
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_release_date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub themes: Vec<String>,
    pub is_favorite: bool,
    pub is_in_wishlist: bool,
    pub game_type: GameType,
    #[serde(default)]
    pub placements: Vec<GamePlacement>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LibraryItem {
    pub fn new(game_id: i64, name: impl Into<String>) -> Self {
        let now = Utc::now();

        Self {
            game_id,
            name: name.into(),
            cover_url: None,
            first_release_date: None,
            rating: None,
            themes: Vec::new(),
            is_favorite: false,
            is_in_wishlist: false,
            game_type: GameType::digital(),
            placements: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the placements and recompute the type tag
    pub fn with_placements(mut self, placements: Vec<GamePlacement>) -> Self {
        self.set_placements(placements);
        self
    }

    pub fn set_placements(&mut self, placements: Vec<GamePlacement>) {
        self.game_type = GameType::for_placements(&placements);
        self.placements = placements;
        self.touch();
    }

    pub fn set_favorite(&mut self, favorite: bool) {
        self.is_favorite = favorite;
        self.touch();
    }

    pub fn set_in_wishlist(&mut self, in_wishlist: bool) {
        self.is_in_wishlist = in_wishlist;
        self.touch();
    }

    /// Sublocation ids (with their parent) this game is shelved in
    pub fn physical_locations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.placements.iter().filter_map(|p| match &p.location {
            PlacementLocation::Physical {
                parent_location_id,
                sublocation_id,
            } => Some((parent_location_id.as_str(), sublocation_id.as_str())),
            PlacementLocation::Digital { .. } => None,
        })
    }

    /// Digital location ids this game is held in
    pub fn digital_locations(&self) -> impl Iterator<Item = &str> {
        self.placements.iter().filter_map(|p| match &p.location {
            PlacementLocation::Digital {
                digital_location_id,
            } => Some(digital_location_id.as_str()),
            PlacementLocation::Physical { .. } => None,
        })
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl CacheableEntity for LibraryItem {
    fn cache_id(&self) -> String {
        self.game_id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn switch() -> Platform {
        Platform::new(130, "Nintendo Switch")
    }

    #[test]
    fn test_game_type_follows_placements() {
        let item = LibraryItem::new(7, "Hollow Knight")
            .with_placements(vec![GamePlacement::digital(switch(), "d1")]);
        assert_eq!(item.game_type, GameType::digital());

        let item = item.with_placements(vec![
            GamePlacement::digital(switch(), "d1"),
            GamePlacement::physical(switch(), "p1", "s1"),
        ]);
        assert_eq!(item.game_type.normalized_text, "physical");
    }

    #[test]
    fn test_location_iterators() {
        let item = LibraryItem::new(7, "Hollow Knight").with_placements(vec![
            GamePlacement::physical(switch(), "p1", "s1"),
            GamePlacement::digital(switch(), "d1"),
            GamePlacement::physical(Platform::new(6, "PC"), "p1", "s2"),
        ]);

        let physical: Vec<_> = item.physical_locations().collect();
        assert_eq!(physical, vec![("p1", "s1"), ("p1", "s2")]);

        let digital: Vec<_> = item.digital_locations().collect();
        assert_eq!(digital, vec!["d1"]);
    }

    #[test]
    fn test_placement_serialization() {
        let placement = GamePlacement::physical(switch(), "p1", "s1");
        let json = serde_json::to_value(&placement).unwrap();

        assert_eq!(json["location"]["kind"], "physical");
        assert_eq!(json["location"]["sublocation_id"], "s1");
        assert_eq!(json["platform"]["name"], "Nintendo Switch");
    }

    #[test]
    fn test_cache_id() {
        assert_eq!(LibraryItem::new(42, "Celeste").cache_id(), "42");
    }
}

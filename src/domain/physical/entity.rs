//! Physical location and sublocation entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::cache::CacheableEntity;

/// A sub-unit of a physical location (e.g. a shelf) that holds game copies
///
/// A sublocation always belongs to exactly one physical location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sublocation {
    pub id: String,
    pub physical_location_id: String,
    pub name: String,
    pub location_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
    /// Number of game copies shelved here
    #[serde(default)]
    pub stored_items: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sublocation {
    pub fn new(
        physical_location_id: impl Into<String>,
        name: impl Into<String>,
        location_type: impl Into<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            physical_location_id: physical_location_id.into(),
            name: name.into(),
            location_type: location_type.into(),
            bg_color: None,
            stored_items: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_bg_color(mut self, color: impl Into<String>) -> Self {
        self.bg_color = Some(color.into());
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl CacheableEntity for Sublocation {
    fn cache_id(&self) -> String {
        self.id.clone()
    }
}

/// A room, house or storage unit that owns sublocations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalLocation {
    pub id: String,
    pub name: String,
    pub location_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_coordinates: Option<String>,
    /// Populated by the repository on reads
    #[serde(default)]
    pub sublocations: Vec<Sublocation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PhysicalLocation {
    pub fn new(name: impl Into<String>, location_type: impl Into<String>) -> Self {
        let now = Utc::now();

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            location_type: location_type.into(),
            map_coordinates: None,
            sublocations: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_map_coordinates(mut self, coordinates: impl Into<String>) -> Self {
        self.map_coordinates = Some(coordinates.into());
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl CacheableEntity for PhysicalLocation {
    fn cache_id(&self) -> String {
        self.id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_are_unique() {
        let a = PhysicalLocation::new("Living Room", "house");
        let b = PhysicalLocation::new("Living Room", "house");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_sublocation_builder() {
        let sub = Sublocation::new("p1", "Top Shelf", "shelf")
            .with_id("s1")
            .with_bg_color("blue");

        assert_eq!(sub.cache_id(), "s1");
        assert_eq!(sub.physical_location_id, "p1");
        assert_eq!(sub.bg_color.as_deref(), Some("blue"));
        assert_eq!(sub.stored_items, 0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let sub = Sublocation::new("p1", "Top Shelf", "shelf").with_id("s1");
        let json = serde_json::to_value(&sub).unwrap();

        assert_eq!(json["physicalLocationId"], "p1");
        assert_eq!(json["locationType"], "shelf");
        assert!(json.get("bgColor").is_none());
    }
}

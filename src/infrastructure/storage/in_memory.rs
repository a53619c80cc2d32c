//! In-memory collection store
//!
//! Implements every repository port over per-user maps. Join rows for the
//! aggregation engine are produced in name order, the way the SQL queries
//! order them.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::aggregation::{
    DashboardRowSet, DigitalLocationRow, DigitalLocationSummaryRow, DigitalPlacementRow, GameRow,
    LibraryRowSet, PhysicalLocationRow, PhysicalPlacementRow,
};
use crate::domain::{
    DashboardRepository, DigitalLocation, DigitalLocationRepository, DomainError, GamePlacement,
    GameType, LibraryItem, LibraryRepository, Payment, PhysicalLocation,
    PhysicalLocationRepository, PlacementLocation, Subscription, Sublocation,
    SublocationRepository,
};

#[derive(Debug, Default)]
struct UserCollection {
    games: HashMap<i64, LibraryItem>,
    physical: HashMap<String, PhysicalLocation>,
    sublocations: HashMap<String, Sublocation>,
    digital: HashMap<String, DigitalLocation>,
}

impl UserCollection {
    fn games_by_name(&self) -> Vec<&LibraryItem> {
        let mut games: Vec<&LibraryItem> = self.games.values().collect();
        games.sort_by(|a, b| a.name.cmp(&b.name).then(a.game_id.cmp(&b.game_id)));
        games
    }

    fn physical_by_name(&self) -> Vec<&PhysicalLocation> {
        let mut locations: Vec<&PhysicalLocation> = self.physical.values().collect();
        locations.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        locations
    }

    fn sublocations_of(&self, parent_id: &str) -> Vec<&Sublocation> {
        let mut sublocations: Vec<&Sublocation> = self
            .sublocations
            .values()
            .filter(|s| s.physical_location_id == parent_id)
            .collect();
        sublocations.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        sublocations
    }

    fn digital_by_name(&self) -> Vec<&DigitalLocation> {
        let mut locations: Vec<&DigitalLocation> = self.digital.values().collect();
        locations.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        locations
    }

    /// Games with at least one copy in the sublocation, in name order
    fn games_in_sublocation(&self, sublocation_id: &str) -> Vec<&LibraryItem> {
        self.games_by_name()
            .into_iter()
            .filter(|g| g.physical_locations().any(|(_, sub)| sub == sublocation_id))
            .collect()
    }

    fn games_in_digital(&self, location_id: &str) -> Vec<&LibraryItem> {
        self.games_by_name()
            .into_iter()
            .filter(|g| g.digital_locations().any(|id| id == location_id))
            .collect()
    }

    fn with_sublocation_count(&self, sublocation: &Sublocation) -> Sublocation {
        let mut sublocation = sublocation.clone();
        sublocation.stored_items = self.games_in_sublocation(&sublocation.id).len() as u32;
        sublocation
    }

    fn hydrate_physical(&self, location: &PhysicalLocation) -> PhysicalLocation {
        let mut location = location.clone();
        location.sublocations = self
            .sublocations_of(&location.id)
            .into_iter()
            .map(|s| self.with_sublocation_count(s))
            .collect();
        location
    }

    fn with_digital_count(&self, location: &DigitalLocation) -> DigitalLocation {
        let mut location = location.clone();
        location.stored_items = self.games_in_digital(&location.id).len() as u32;
        location
    }

    fn check_placements(&self, placements: &[GamePlacement]) -> Result<(), DomainError> {
        for placement in placements {
            match &placement.location {
                PlacementLocation::Physical {
                    parent_location_id,
                    sublocation_id,
                } => {
                    let sublocation = self.sublocations.get(sublocation_id).ok_or_else(|| {
                        DomainError::validation(format!("Unknown sublocation '{}'", sublocation_id))
                    })?;

                    if &sublocation.physical_location_id != parent_location_id {
                        return Err(DomainError::validation(format!(
                            "Sublocation '{}' does not belong to location '{}'",
                            sublocation_id, parent_location_id
                        )));
                    }
                }
                PlacementLocation::Digital {
                    digital_location_id,
                } => {
                    if !self.digital.contains_key(digital_location_id) {
                        return Err(DomainError::validation(format!(
                            "Unknown digital location '{}'",
                            digital_location_id
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Drops matching placements from every game, keeping type tags in sync
    fn remove_placements(&mut self, matches: impl Fn(&PlacementLocation) -> bool) {
        for game in self.games.values_mut() {
            if game.placements.iter().any(|p| matches(&p.location)) {
                let kept = game
                    .placements
                    .iter()
                    .filter(|p| !matches(&p.location))
                    .cloned()
                    .collect();
                game.set_placements(kept);
            }
        }
    }

    fn library_rows(&self) -> LibraryRowSet {
        let mut rows = LibraryRowSet::default();

        for game in self.games_by_name() {
            rows.games.push(GameRow {
                game_id: game.game_id,
                name: game.name.clone(),
                cover_url: game.cover_url.clone(),
                first_release_date: game.first_release_date,
                rating: game.rating,
                themes: game.themes.clone(),
                is_favorite: game.is_favorite,
                is_in_wishlist: game.is_in_wishlist,
                game_type_display: game.game_type.display_text.clone(),
                game_type_normalized: game.game_type.normalized_text.clone(),
                created_at: game.created_at,
            });

            for placement in &game.placements {
                match &placement.location {
                    PlacementLocation::Physical {
                        parent_location_id,
                        sublocation_id,
                    } => {
                        let parent = self.physical.get(parent_location_id);
                        let sublocation = self.sublocations.get(sublocation_id);

                        rows.physical.push(PhysicalPlacementRow {
                            game_id: game.game_id,
                            platform_id: placement.platform.id,
                            platform_name: placement.platform.name.clone(),
                            parent_location_id: parent.map(|p| p.id.clone()),
                            parent_location_name: parent.map(|p| p.name.clone()),
                            parent_location_type: parent.map(|p| p.location_type.clone()),
                            sublocation_id: sublocation.map(|s| s.id.clone()),
                            sublocation_name: sublocation.map(|s| s.name.clone()),
                            sublocation_type: sublocation.map(|s| s.location_type.clone()),
                        });
                    }
                    PlacementLocation::Digital {
                        digital_location_id,
                    } => {
                        let location = self.digital.get(digital_location_id);
                        let subscription = location.and_then(|l| l.subscription.as_ref());

                        rows.digital.push(DigitalPlacementRow {
                            game_id: game.game_id,
                            platform_id: placement.platform.id,
                            platform_name: placement.platform.name.clone(),
                            digital_location_id: location.map(|l| l.id.clone()),
                            digital_location_name: location.map(|l| l.name.clone()),
                            is_subscription: location.is_some_and(|l| l.is_subscription),
                            is_active: location.is_some_and(|l| l.is_active),
                            billing_cycle: subscription.map(|s| s.billing_cycle.clone()),
                            cost_per_cycle: subscription.map(|s| s.cost_per_cycle),
                        });
                    }
                }
            }
        }

        rows
    }

    fn physical_rows(&self) -> Vec<PhysicalLocationRow> {
        let mut rows = Vec::new();

        for location in self.physical_by_name() {
            let base = PhysicalLocationRow {
                location_id: location.id.clone(),
                location_name: location.name.clone(),
                location_type: location.location_type.clone(),
                map_coordinates: location.map_coordinates.clone(),
                sublocation_id: None,
                sublocation_name: None,
                sublocation_type: None,
                bg_color: None,
                game_id: None,
                game_name: None,
                platform_id: None,
                platform_name: None,
            };

            let sublocations = self.sublocations_of(&location.id);

            if sublocations.is_empty() {
                rows.push(base);
                continue;
            }

            for sublocation in sublocations {
                let shelf = PhysicalLocationRow {
                    sublocation_id: Some(sublocation.id.clone()),
                    sublocation_name: Some(sublocation.name.clone()),
                    sublocation_type: Some(sublocation.location_type.clone()),
                    bg_color: sublocation.bg_color.clone(),
                    ..base.clone()
                };

                let games = self.games_in_sublocation(&sublocation.id);

                if games.is_empty() {
                    rows.push(shelf);
                    continue;
                }

                for game in games {
                    let platforms = game.placements.iter().filter(|p| {
                        matches!(&p.location, PlacementLocation::Physical { sublocation_id, .. } if sublocation_id == &sublocation.id)
                    });

                    for placement in platforms {
                        rows.push(PhysicalLocationRow {
                            game_id: Some(game.game_id),
                            game_name: Some(game.name.clone()),
                            platform_id: Some(placement.platform.id),
                            platform_name: Some(placement.platform.name.clone()),
                            ..shelf.clone()
                        });
                    }
                }
            }
        }

        rows
    }

    fn digital_rows(&self) -> Vec<DigitalLocationRow> {
        let mut rows = Vec::new();

        for location in self.digital_by_name() {
            let subscription = location.subscription.as_ref();
            let base = DigitalLocationRow {
                location_id: location.id.clone(),
                location_name: location.name.clone(),
                is_subscription: location.is_subscription,
                is_active: location.is_active,
                url: location.url.clone(),
                billing_cycle: subscription.map(|s| s.billing_cycle.clone()),
                cost_per_cycle: subscription.map(|s| s.cost_per_cycle),
                anchor_date: subscription.map(|s| s.anchor_date),
                payment_method: subscription.map(|s| s.payment_method.clone()),
                game_id: None,
                game_name: None,
                platform_id: None,
                platform_name: None,
            };

            let games = self.games_in_digital(&location.id);

            if games.is_empty() {
                rows.push(base);
                continue;
            }

            for game in games {
                let platforms = game.placements.iter().filter(|p| {
                    matches!(&p.location, PlacementLocation::Digital { digital_location_id } if digital_location_id == &location.id)
                });

                for placement in platforms {
                    rows.push(DigitalLocationRow {
                        game_id: Some(game.game_id),
                        game_name: Some(game.name.clone()),
                        platform_id: Some(placement.platform.id),
                        platform_name: Some(placement.platform.name.clone()),
                        ..base.clone()
                    });
                }
            }
        }

        rows
    }
}

type Users = HashMap<String, UserCollection>;

/// Thread-safe in-memory implementation of every collection repository
///
/// Useful for development and tests. Data is lost when the process terminates.
#[derive(Debug, Default)]
pub struct InMemoryCollectionStore {
    users: RwLock<Users>,
}

impl InMemoryCollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Users>, DomainError> {
        self.users
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Users>, DomainError> {
        self.users
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))
    }

    fn with_user<R>(&self, user_id: &str, f: impl FnOnce(&UserCollection) -> R) -> Result<R, DomainError> {
        let users = self.read()?;
        let empty = UserCollection::default();

        Ok(f(users.get(user_id).unwrap_or(&empty)))
    }

    fn with_user_mut<R>(
        &self,
        user_id: &str,
        f: impl FnOnce(&mut UserCollection) -> Result<R, DomainError>,
    ) -> Result<R, DomainError> {
        let mut users = self.write()?;
        f(users.entry(user_id.to_string()).or_default())
    }
}

#[async_trait]
impl LibraryRepository for InMemoryCollectionStore {
    async fn list(&self, user_id: &str) -> Result<Vec<LibraryItem>, DomainError> {
        self.with_user(user_id, |c| c.games_by_name().into_iter().cloned().collect())
    }

    async fn get(&self, user_id: &str, game_id: i64) -> Result<Option<LibraryItem>, DomainError> {
        self.with_user(user_id, |c| c.games.get(&game_id).cloned())
    }

    async fn create(&self, user_id: &str, mut item: LibraryItem) -> Result<LibraryItem, DomainError> {
        self.with_user_mut(user_id, |c| {
            if c.games.contains_key(&item.game_id) {
                return Err(DomainError::conflict(format!(
                    "Game {} is already in the library",
                    item.game_id
                )));
            }

            c.check_placements(&item.placements)?;
            item.game_type = GameType::for_placements(&item.placements);
            c.games.insert(item.game_id, item.clone());

            debug!(user_id = %user_id, game_id = item.game_id, "Stored library item");
            Ok(item)
        })
    }

    async fn update(&self, user_id: &str, mut item: LibraryItem) -> Result<LibraryItem, DomainError> {
        self.with_user_mut(user_id, |c| {
            let existing = c.games.get(&item.game_id).ok_or_else(|| {
                DomainError::not_found(format!("Game {} is not in the library", item.game_id))
            })?;

            c.check_placements(&item.placements)?;
            item.created_at = existing.created_at;
            item.game_type = GameType::for_placements(&item.placements);
            c.games.insert(item.game_id, item.clone());
            Ok(item)
        })
    }

    async fn delete(&self, user_id: &str, game_id: i64) -> Result<bool, DomainError> {
        self.with_user_mut(user_id, |c| Ok(c.games.remove(&game_id).is_some()))
    }

    async fn library_rows(&self, user_id: &str) -> Result<LibraryRowSet, DomainError> {
        self.with_user(user_id, UserCollection::library_rows)
    }
}

#[async_trait]
impl PhysicalLocationRepository for InMemoryCollectionStore {
    async fn list(&self, user_id: &str) -> Result<Vec<PhysicalLocation>, DomainError> {
        self.with_user(user_id, |c| {
            c.physical_by_name()
                .into_iter()
                .map(|l| c.hydrate_physical(l))
                .collect()
        })
    }

    async fn get(&self, user_id: &str, id: &str) -> Result<Option<PhysicalLocation>, DomainError> {
        self.with_user(user_id, |c| c.physical.get(id).map(|l| c.hydrate_physical(l)))
    }

    async fn create(
        &self,
        user_id: &str,
        mut location: PhysicalLocation,
    ) -> Result<PhysicalLocation, DomainError> {
        self.with_user_mut(user_id, |c| {
            if c.physical.contains_key(&location.id) {
                return Err(DomainError::conflict(format!(
                    "Physical location '{}' already exists",
                    location.id
                )));
            }

            location.sublocations.clear();
            c.physical.insert(location.id.clone(), location.clone());
            Ok(location)
        })
    }

    async fn update(
        &self,
        user_id: &str,
        mut location: PhysicalLocation,
    ) -> Result<PhysicalLocation, DomainError> {
        self.with_user_mut(user_id, |c| {
            let existing = c.physical.get(&location.id).ok_or_else(|| {
                DomainError::not_found(format!("Physical location '{}' not found", location.id))
            })?;

            location.created_at = existing.created_at;
            location.sublocations.clear();
            c.physical.insert(location.id.clone(), location.clone());
            Ok(c.hydrate_physical(&location))
        })
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, DomainError> {
        self.with_user_mut(user_id, |c| {
            if c.physical.remove(id).is_none() {
                return Ok(false);
            }

            c.sublocations.retain(|_, s| s.physical_location_id != id);
            c.remove_placements(|location| {
                matches!(location, PlacementLocation::Physical { parent_location_id, .. } if parent_location_id == id)
            });

            Ok(true)
        })
    }

    async fn stored_game_ids(&self, user_id: &str, id: &str) -> Result<Vec<i64>, DomainError> {
        self.with_user(user_id, |c| {
            c.games_by_name()
                .into_iter()
                .filter(|g| g.physical_locations().any(|(parent, _)| parent == id))
                .map(|g| g.game_id)
                .collect()
        })
    }

    async fn physical_rows(&self, user_id: &str) -> Result<Vec<PhysicalLocationRow>, DomainError> {
        self.with_user(user_id, UserCollection::physical_rows)
    }
}

#[async_trait]
impl SublocationRepository for InMemoryCollectionStore {
    async fn list(&self, user_id: &str) -> Result<Vec<Sublocation>, DomainError> {
        self.with_user(user_id, |c| {
            c.physical_by_name()
                .into_iter()
                .flat_map(|l| c.sublocations_of(&l.id))
                .map(|s| c.with_sublocation_count(s))
                .collect()
        })
    }

    async fn get(&self, user_id: &str, id: &str) -> Result<Option<Sublocation>, DomainError> {
        self.with_user(user_id, |c| c.sublocations.get(id).map(|s| c.with_sublocation_count(s)))
    }

    async fn create(&self, user_id: &str, sublocation: Sublocation) -> Result<Sublocation, DomainError> {
        self.with_user_mut(user_id, |c| {
            if !c.physical.contains_key(&sublocation.physical_location_id) {
                return Err(DomainError::not_found(format!(
                    "Physical location '{}' not found",
                    sublocation.physical_location_id
                )));
            }

            if c.sublocations.contains_key(&sublocation.id) {
                return Err(DomainError::conflict(format!(
                    "Sublocation '{}' already exists",
                    sublocation.id
                )));
            }

            c.sublocations.insert(sublocation.id.clone(), sublocation.clone());
            Ok(sublocation)
        })
    }

    async fn update(&self, user_id: &str, mut sublocation: Sublocation) -> Result<Sublocation, DomainError> {
        self.with_user_mut(user_id, |c| {
            let existing = c.sublocations.get(&sublocation.id).ok_or_else(|| {
                DomainError::not_found(format!("Sublocation '{}' not found", sublocation.id))
            })?;

            if !c.physical.contains_key(&sublocation.physical_location_id) {
                return Err(DomainError::not_found(format!(
                    "Physical location '{}' not found",
                    sublocation.physical_location_id
                )));
            }

            sublocation.created_at = existing.created_at;
            let moved = existing.physical_location_id != sublocation.physical_location_id;

            if moved {
                let new_parent = sublocation.physical_location_id.clone();

                for game in c.games.values_mut() {
                    for placement in &mut game.placements {
                        if let PlacementLocation::Physical {
                            parent_location_id,
                            sublocation_id,
                        } = &mut placement.location
                        {
                            if sublocation_id == &sublocation.id {
                                *parent_location_id = new_parent.clone();
                            }
                        }
                    }
                }
            }

            c.sublocations.insert(sublocation.id.clone(), sublocation.clone());
            Ok(c.with_sublocation_count(&sublocation))
        })
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, DomainError> {
        self.with_user_mut(user_id, |c| {
            if c.sublocations.remove(id).is_none() {
                return Ok(false);
            }

            c.remove_placements(|location| {
                matches!(location, PlacementLocation::Physical { sublocation_id, .. } if sublocation_id == id)
            });

            Ok(true)
        })
    }

    async fn stored_game_ids(&self, user_id: &str, id: &str) -> Result<Vec<i64>, DomainError> {
        self.with_user(user_id, |c| {
            c.games_in_sublocation(id).into_iter().map(|g| g.game_id).collect()
        })
    }
}

#[async_trait]
impl DigitalLocationRepository for InMemoryCollectionStore {
    async fn list(&self, user_id: &str) -> Result<Vec<DigitalLocation>, DomainError> {
        self.with_user(user_id, |c| {
            c.digital_by_name()
                .into_iter()
                .map(|l| c.with_digital_count(l))
                .collect()
        })
    }

    async fn get(&self, user_id: &str, id: &str) -> Result<Option<DigitalLocation>, DomainError> {
        self.with_user(user_id, |c| c.digital.get(id).map(|l| c.with_digital_count(l)))
    }

    async fn create(&self, user_id: &str, location: DigitalLocation) -> Result<DigitalLocation, DomainError> {
        self.with_user_mut(user_id, |c| {
            if c.digital.contains_key(&location.id) {
                return Err(DomainError::conflict(format!(
                    "Digital location '{}' already exists",
                    location.id
                )));
            }

            c.digital.insert(location.id.clone(), location.clone());
            Ok(location)
        })
    }

    async fn update(&self, user_id: &str, mut location: DigitalLocation) -> Result<DigitalLocation, DomainError> {
        self.with_user_mut(user_id, |c| {
            let existing = c.digital.get(&location.id).ok_or_else(|| {
                DomainError::not_found(format!("Digital location '{}' not found", location.id))
            })?;

            location.created_at = existing.created_at;
            location.payments = existing.payments.clone();
            c.digital.insert(location.id.clone(), location.clone());
            Ok(c.with_digital_count(&location))
        })
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, DomainError> {
        self.with_user_mut(user_id, |c| {
            if c.digital.remove(id).is_none() {
                return Ok(false);
            }

            c.remove_placements(|location| {
                matches!(location, PlacementLocation::Digital { digital_location_id } if digital_location_id == id)
            });

            Ok(true)
        })
    }

    async fn upsert_subscription(
        &self,
        user_id: &str,
        location_id: &str,
        subscription: Subscription,
    ) -> Result<DigitalLocation, DomainError> {
        self.with_user_mut(user_id, |c| {
            let location = c.digital.get_mut(location_id).ok_or_else(|| {
                DomainError::not_found(format!("Digital location '{}' not found", location_id))
            })?;

            location.is_subscription = true;
            location.subscription = Some(subscription);
            location.touch();

            let location = location.clone();
            Ok(c.with_digital_count(&location))
        })
    }

    async fn remove_subscription(&self, user_id: &str, location_id: &str) -> Result<bool, DomainError> {
        self.with_user_mut(user_id, |c| {
            let location = c.digital.get_mut(location_id).ok_or_else(|| {
                DomainError::not_found(format!("Digital location '{}' not found", location_id))
            })?;

            let existed = location.subscription.take().is_some();
            location.is_subscription = false;
            location.touch();
            Ok(existed)
        })
    }

    async fn add_payment(&self, user_id: &str, location_id: &str, payment: Payment) -> Result<Payment, DomainError> {
        self.with_user_mut(user_id, |c| {
            let location = c.digital.get_mut(location_id).ok_or_else(|| {
                DomainError::not_found(format!("Digital location '{}' not found", location_id))
            })?;

            location.payments.push(payment.clone());
            location.touch();
            Ok(payment)
        })
    }

    async fn stored_game_ids(&self, user_id: &str, id: &str) -> Result<Vec<i64>, DomainError> {
        self.with_user(user_id, |c| {
            c.games_in_digital(id).into_iter().map(|g| g.game_id).collect()
        })
    }

    async fn digital_rows(&self, user_id: &str) -> Result<Vec<DigitalLocationRow>, DomainError> {
        self.with_user(user_id, UserCollection::digital_rows)
    }
}

#[async_trait]
impl DashboardRepository for InMemoryCollectionStore {
    async fn dashboard_rows(&self, user_id: &str) -> Result<DashboardRowSet, DomainError> {
        self.with_user(user_id, |c| DashboardRowSet {
            library: c.library_rows(),
            physical_location_count: c.physical.len(),
            sublocation_count: c.sublocations.len(),
            digital_locations: c
                .digital_by_name()
                .into_iter()
                .map(|l| DigitalLocationSummaryRow {
                    location_id: l.id.clone(),
                    location_name: l.name.clone(),
                    is_subscription: l.is_subscription,
                    is_active: l.is_active,
                    billing_cycle: l.subscription.as_ref().map(|s| s.billing_cycle.clone()),
                    cost_per_cycle: l.subscription.as_ref().map(|s| s.cost_per_cycle),
                })
                .collect(),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::domain::aggregation::build_library_bff;
    use crate::domain::Platform;
    use chrono::Utc;

    #[tokio::test]
    async fn test_library_rows_feed_aggregation() {
        let store = seeded_store().await;

        let rows = LibraryRepository::library_rows(&store, USER).await.unwrap();
        assert_eq!(rows.games.len(), 1);
        assert_eq!(rows.physical.len(), 1);
        assert_eq!(rows.digital.len(), 1);

        let bff = build_library_bff(&rows, Utc::now());
        let item = &bff.library_items[0];
        assert_eq!(item.physical_locations[0].parent_location_id, "p1");
        assert_eq!(item.physical_locations[0].sublocation_id, "s1");
        assert_eq!(item.digital_locations[0].monthly_cost, 10.0);
        assert_eq!(bff.recently_added.len(), 1);
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let store = seeded_store().await;

        assert!(LibraryRepository::list(&store, "someone-else").await.unwrap().is_empty());
        assert!(PhysicalLocationRepository::get(&store, "someone-else", "p1")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_game_is_conflict() {
        let store = seeded_store().await;

        let err = LibraryRepository::create(&store, USER, LibraryItem::new(7, "Hollow Knight"))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_placement_must_reference_existing_sublocation() {
        let store = seeded_store().await;

        let item = LibraryItem::new(8, "Celeste")
            .with_placements(vec![GamePlacement::physical(switch(), "p1", "missing")]);

        let err = LibraryRepository::create(&store, USER, item).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_sublocation_requires_parent() {
        let store = InMemoryCollectionStore::new();

        let err = SublocationRepository::create(&store, USER, Sublocation::new("nope", "Shelf", "shelf"))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_physical_location_hydrates_sublocation_counts() {
        let store = seeded_store().await;

        let location = PhysicalLocationRepository::get(&store, USER, "p1")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(location.sublocations.len(), 1);
        assert_eq!(location.sublocations[0].stored_items, 1);
    }

    #[tokio::test]
    async fn test_deleting_physical_location_cascades() {
        let store = seeded_store().await;

        assert!(PhysicalLocationRepository::delete(&store, USER, "p1").await.unwrap());

        assert!(SublocationRepository::get(&store, USER, "s1").await.unwrap().is_none());

        let game = LibraryRepository::get(&store, USER, 7).await.unwrap().unwrap();
        assert_eq!(game.physical_locations().count(), 0);
        assert_eq!(game.digital_locations().count(), 1);
        assert_eq!(game.game_type, GameType::digital());
    }

    #[tokio::test]
    async fn test_moving_sublocation_updates_placements() {
        let store = seeded_store().await;

        PhysicalLocationRepository::create(&store, USER, PhysicalLocation::new("Office", "room").with_id("p2"))
            .await
            .unwrap();

        let mut shelf = SublocationRepository::get(&store, USER, "s1").await.unwrap().unwrap();
        shelf.physical_location_id = "p2".to_string();
        SublocationRepository::update(&store, USER, shelf).await.unwrap();

        let game = LibraryRepository::get(&store, USER, 7).await.unwrap().unwrap();
        assert_eq!(game.physical_locations().collect::<Vec<_>>(), vec![("p2", "s1")]);
    }

    #[tokio::test]
    async fn test_physical_rows_include_empty_locations() {
        let store = seeded_store().await;

        PhysicalLocationRepository::create(&store, USER, PhysicalLocation::new("Attic", "house").with_id("p0"))
            .await
            .unwrap();

        let rows = PhysicalLocationRepository::physical_rows(&store, USER).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].location_name, "Attic");
        assert!(rows[0].sublocation_id.is_none());
        assert_eq!(rows[1].game_id, Some(7));
    }

    #[tokio::test]
    async fn test_subscription_lifecycle() {
        let store = seeded_store().await;

        assert!(DigitalLocationRepository::remove_subscription(&store, USER, "d1").await.unwrap());
        assert!(!DigitalLocationRepository::remove_subscription(&store, USER, "d1").await.unwrap());

        let location = DigitalLocationRepository::get(&store, USER, "d1").await.unwrap().unwrap();
        assert!(!location.is_subscription);
        assert_eq!(location.stored_items, 1);

        let payment = Payment::new(30.0, chrono::NaiveDate::from_ymd_opt(2026, 4, 1).unwrap());
        DigitalLocationRepository::add_payment(&store, USER, "d1", payment).await.unwrap();

        let location = DigitalLocationRepository::get(&store, USER, "d1").await.unwrap().unwrap();
        assert_eq!(location.payments.len(), 1);
    }

    #[tokio::test]
    async fn test_dashboard_rows() {
        let store = seeded_store().await;

        LibraryRepository::create(
            &store,
            USER,
            LibraryItem::new(9, "Tetris").with_placements(vec![GamePlacement::digital(Platform::new(6, "PC"), "d1")]),
        )
        .await
        .unwrap();

        let rows = DashboardRepository::dashboard_rows(&store, USER).await.unwrap();

        assert_eq!(rows.library.games.len(), 2);
        assert_eq!(rows.physical_location_count, 1);
        assert_eq!(rows.sublocation_count, 1);
        assert_eq!(rows.digital_locations.len(), 1);
    }
}

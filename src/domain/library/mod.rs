//! Library domain module
//!
//! A library item is a game a user owns (or wishes for), together with every
//! platform/location pair where a copy is held.

mod entity;
mod repository;

pub use entity::{GamePlacement, GameType, LibraryItem, PlacementLocation, Platform};
pub use repository::LibraryRepository;

#[cfg(test)]
pub use repository::MockLibraryRepository;

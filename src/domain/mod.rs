//! Domain layer - entities, repository ports, cache port and aggregation

pub mod aggregation;
pub mod cache;
pub mod dashboard;
pub mod digital;
pub mod error;
pub mod library;
pub mod physical;

pub use cache::{Cache, CacheDomain, CacheExt, CacheKeys, CacheableEntity};
pub use dashboard::DashboardRepository;
pub use digital::{BillingCycle, DigitalLocation, DigitalLocationRepository, Payment, Subscription};
pub use error::DomainError;
pub use library::{GamePlacement, GameType, LibraryItem, LibraryRepository, PlacementLocation, Platform};
pub use physical::{PhysicalLocation, PhysicalLocationRepository, Sublocation, SublocationRepository};

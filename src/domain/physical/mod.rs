//! Physical locations and the sublocations they own

mod entity;
mod repository;

pub use entity::{PhysicalLocation, Sublocation};
pub use repository::{PhysicalLocationRepository, SublocationRepository};

#[cfg(test)]
pub use repository::{MockPhysicalLocationRepository, MockSublocationRepository};

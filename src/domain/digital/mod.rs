//! Digital locations: storefronts and subscription services

mod billing;
mod entity;
mod repository;

pub use billing::BillingCycle;
pub use entity::{DigitalLocation, Payment, Subscription};
pub use repository::DigitalLocationRepository;

#[cfg(test)]
pub use repository::MockDigitalLocationRepository;

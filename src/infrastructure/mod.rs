//! Infrastructure layer - cache backends, storage, services and observability

pub mod cache;
pub mod logging;
pub mod observability;
pub mod services;
pub mod storage;

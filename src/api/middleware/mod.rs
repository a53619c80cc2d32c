//! API middleware components

pub mod current_user;
pub mod metrics;

pub use current_user::CurrentUser;
pub use metrics::metrics_middleware;

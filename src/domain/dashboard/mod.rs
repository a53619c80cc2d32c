//! Dashboard statistics port

mod repository;

pub use repository::DashboardRepository;

#[cfg(test)]
pub use repository::MockDashboardRepository;

//! Aggregation engine
//!
//! Pure transformations from flat join rows to the nested BFF shapes served to
//! clients. Nothing here performs I/O or reads the clock; callers pass `now`.

mod cost;
mod dashboard;
mod digital;
mod grouping;
mod library;
mod physical;
mod recent;
mod rows;

pub use cost::{monthly_cost, monthly_cost_of};
pub use dashboard::{build_dashboard, DashboardStats, PlatformCount};
pub use digital::{build_digital_bff, DigitalBffResponse, DigitalLocationView, SubscriptionView};
pub use grouping::{OrderedGroups, PlatformVersion};
pub use library::{
    build_library_bff, DigitalLocationGroup, LibraryBffItem, LibraryBffResponse,
    PhysicalLocationGroup,
};
pub use physical::{
    build_physical_bff, PhysicalBffResponse, PhysicalLocationView, StoredGameView,
    SublocationView,
};
pub use recent::{RecentlyAddedWindow, RECENTLY_ADDED_MONTHS};
pub use rows::{
    DashboardRowSet, DigitalLocationRow, DigitalLocationSummaryRow, DigitalPlacementRow, GameRow,
    LibraryRowSet, PhysicalLocationRow, PhysicalPlacementRow,
};

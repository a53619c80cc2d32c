//! Infrastructure services
//!
//! Each service pairs a repository with a typed view of the shared cache:
//! reads go cache-first, writes hit the repository and then clear every key
//! derived from what they touched.

mod cache_support;
mod dashboard_service;
mod digital_location_service;
mod library_service;
mod physical_location_service;
mod sublocation_service;
mod validation;

pub use cache_support::{CachePolicy, BFF_VIEW, DASHBOARD, DIGITAL, LIBRARY, PHYSICAL, STATS_VIEW, SUBLOCATION};
pub use dashboard_service::DashboardService;
pub use digital_location_service::{
    CreateDigitalLocationRequest, DigitalLocationService, RecordPaymentRequest,
    SubscriptionRequest, UpdateDigitalLocationRequest,
};
pub use library_service::{CreateLibraryItemRequest, LibraryService, UpdateLibraryItemRequest};
pub use physical_location_service::{
    CreatePhysicalLocationRequest, PhysicalLocationService, UpdatePhysicalLocationRequest,
};
pub use sublocation_service::{
    CreateSublocationRequest, SublocationService, UpdateSublocationRequest,
};

//! # Endpoint Wrappers
//!
//! One typed wrapper per server area. Every method returns the raw envelope
//! (or bytes for downloads); interpretation is left to
//! [`classify`](crate::classify) and the [`CallWrapper`](crate::CallWrapper).
//!
//! ## Available APIs
//!
//! - `UserApi` - login, registration, own profile and password
//! - `AdminApi` - user management and download quotas (admin only)
//! - `CementPlantApi` - plants, satellite identifications, statistics
//! - `FilesApi` - shared upload directory
//! - `GeoFilesApi` - TIF rasters, tiles and bulk downloads
//! - `PollutionApi` - pollution records and queued downloads

pub mod admin;
pub mod cement_plant;
pub mod files;
pub mod geo_files;
pub mod pollution;
pub mod tasks;
pub mod user;

pub use admin::AdminApi;
pub use cement_plant::{BoundingBox, CementPlantApi, IdentificationSearch, PlantSearch};
pub use files::FilesApi;
pub use geo_files::GeoFilesApi;
pub use pollution::PollutionApi;
pub use tasks::PollPolicy;
pub use user::UserApi;

/// Percent-encode one path segment.
pub(crate) fn segment(value: impl std::fmt::Display) -> String {
    urlencoding::encode(&value.to_string()).into_owned()
}

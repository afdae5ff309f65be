//! Workspace umbrella crate.
//!
//! Maps the `desktop-shims` and `wasm` feature flags onto `core-service` and
//! re-exports it, so a host application can depend on `plantwatch-workspace`
//! alone and reach [`PlantClient`] without wiring each crate individually.

#[cfg(any(feature = "desktop-shims", feature = "wasm"))]
pub use core_service::*;

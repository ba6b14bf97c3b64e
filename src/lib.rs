pub mod batch;
pub mod core;
pub mod notifications;
pub mod queue;

include!(concat!(env!("OUT_DIR"), "/version.rs"));

/// Crate version from the package manifest
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

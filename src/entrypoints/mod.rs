// Shared modules
pub(crate) mod async_runtime;
pub(crate) mod cli;
pub(crate) mod logging;
mod metadata;

// Entry points
#[cfg(not(target_arch = "wasm32"))]
mod run;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub(crate) use metadata::short_version_info;
#[cfg(not(target_arch = "wasm32"))]
pub use run::run_native;

/// Window title and app id
pub const APP_NAME: &str = "NavApp";

mod app;
mod entrypoints;
pub mod measure;

pub use app::NavApp;

#[cfg(not(target_arch = "wasm32"))]
pub use entrypoints::run_native;

#[cfg(target_arch = "wasm32")]
pub use entrypoints::web::WebHandle;

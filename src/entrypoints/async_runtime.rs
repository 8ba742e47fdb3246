//! Cross-platform task spawning
//!
//! Natively, tasks run on the tokio multi-threaded runtime entered by
//! [`run_native`](super::run_native). On the web there is a single thread and
//! futures run on the JavaScript event loop through `wasm-bindgen-futures`,
//! which also means they do not have to be `Send`.

use std::future::Future;

/// `Send` on native targets, nothing on the web
#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSend: Send {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send> MaybeSend for T {}

#[cfg(target_arch = "wasm32")]
pub trait MaybeSend {}
#[cfg(target_arch = "wasm32")]
impl<T> MaybeSend for T {}

/// `Sync` on native targets, nothing on the web
#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSync: Sync {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Sync> MaybeSync for T {}

#[cfg(target_arch = "wasm32")]
pub trait MaybeSync {}
#[cfg(target_arch = "wasm32")]
impl<T> MaybeSync for T {}

/// Spawn a fire-and-forget task.
///
/// Must be called from within the tokio runtime on native targets.
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn<F>(future: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    if !in_runtime_context() {
        tracing::error!("No async runtime available, dropping task");
        return;
    }
    tokio::spawn(future);
}

/// Spawn a fire-and-forget task on the browser event loop.
#[cfg(target_arch = "wasm32")]
pub fn spawn<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

/// Whether a tokio runtime is reachable from the current thread
#[cfg(not(target_arch = "wasm32"))]
pub fn in_runtime_context() -> bool {
    tokio::runtime::Handle::try_current().is_ok()
}

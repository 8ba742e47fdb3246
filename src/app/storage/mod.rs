//! Key/value storage for user preferences.
//!
//! [`StorageBackend`] is a small string-level trait with one implementation
//! per platform:
//!
//! - `WebLocalStorage` (`wasm32`): `window.localStorage`.
//! - `FileStorage` (native): a single JSON object of string keys to string
//!   values in the per-user config directory, read once and rewritten on
//!   every change.
//! - [`MemoryStorage`]: used when the platform storage is unavailable, and in
//!   tests.

use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    #[cfg(not(target_arch = "wasm32"))]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    #[cfg(not(target_arch = "wasm32"))]
    Json(#[from] serde_json::Error),

    #[error("Platform storage error: {0}")]
    Platform(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Keys and values are UTF-8 strings.
pub trait StorageBackend: Send + Sync {
    fn set_string(&self, key: &str, value: &str) -> StorageResult<()>;

    /// `Ok(None)` when the key is missing.
    fn get_string(&self, key: &str) -> StorageResult<Option<String>>;
}

fn lock_map(
    map: &Mutex<HashMap<String, String>>,
) -> StorageResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
    map.lock()
        .map_err(|e| StorageError::Platform(format!("mutex poisoned: {e}")))
}

/// Process-local storage, lost on exit
#[derive(Default)]
pub struct MemoryStorage {
    inner: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn set_string(&self, key: &str, value: &str) -> StorageResult<()> {
        lock_map(&self.inner)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_string(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(lock_map(&self.inner)?.get(key).cloned())
    }
}

#[cfg(target_arch = "wasm32")]
mod web_storage {
    use super::*;
    use web_sys::Storage;

    fn local_storage() -> StorageResult<Storage> {
        web_sys::window()
            .ok_or_else(|| StorageError::Platform("no window".into()))?
            .local_storage()
            .map_err(|e| StorageError::Platform(format!("local_storage() failed: {e:?}")))?
            .ok_or_else(|| StorageError::Platform("local_storage not available".into()))
    }

    /// Browser `localStorage`
    pub struct WebLocalStorage;

    impl StorageBackend for WebLocalStorage {
        fn set_string(&self, key: &str, value: &str) -> StorageResult<()> {
            local_storage()?
                .set_item(key, value)
                .map_err(|e| StorageError::Platform(format!("set_item error: {e:?}")))
        }

        fn get_string(&self, key: &str) -> StorageResult<Option<String>> {
            local_storage()?
                .get_item(key)
                .map_err(|e| StorageError::Platform(format!("get_item error: {e:?}")))
        }
    }

    pub fn default_backend() -> StorageResult<Box<dyn StorageBackend>> {
        // Fail early (e.g. storage disabled by privacy settings)
        local_storage()?;
        Ok(Box::new(WebLocalStorage))
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod file_storage {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    /// JSON file holding every key. Mutations are flushed synchronously.
    pub struct FileStorage {
        path: PathBuf,
        inner: Mutex<HashMap<String, String>>,
    }

    impl FileStorage {
        /// `<config dir>/navapp/storage.json`, or the working directory when
        /// the platform has no config directory.
        fn default_storage_path() -> PathBuf {
            match dirs::config_dir() {
                Some(dir) => dir.join("navapp").join("storage.json"),
                None => PathBuf::from("navapp-storage.json"),
            }
        }

        pub fn open(path: Option<PathBuf>) -> StorageResult<Self> {
            let path = path.unwrap_or_else(Self::default_storage_path);
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)?;
            }

            let map = if path.exists() {
                let s = fs::read_to_string(&path)?;
                if s.trim().is_empty() {
                    HashMap::new()
                } else {
                    serde_json::from_str(&s)?
                }
            } else {
                HashMap::new()
            };
            tracing::debug!("Using storage file {}", path.display());

            Ok(Self {
                path,
                inner: Mutex::new(map),
            })
        }

        fn flush(&self, map: &HashMap<String, String>) -> StorageResult<()> {
            let s = serde_json::to_string_pretty(map)?;
            fs::write(&self.path, s)?;
            Ok(())
        }
    }

    impl StorageBackend for FileStorage {
        fn set_string(&self, key: &str, value: &str) -> StorageResult<()> {
            let mut guard = lock_map(&self.inner)?;
            guard.insert(key.to_string(), value.to_string());
            self.flush(&guard)
        }

        fn get_string(&self, key: &str) -> StorageResult<Option<String>> {
            Ok(lock_map(&self.inner)?.get(key).cloned())
        }
    }

    pub fn default_backend() -> StorageResult<Box<dyn StorageBackend>> {
        Ok(Box::new(FileStorage::open(None)?))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn temp_path(name: &str) -> PathBuf {
            std::env::temp_dir()
                .join(format!("navapp-test-{}-{name}", std::process::id()))
                .join("storage.json")
        }

        #[test]
        fn test_file_storage_persists_across_instances() {
            let path = temp_path("persist");
            let _ = fs::remove_file(&path);

            let storage = FileStorage::open(Some(path.clone())).unwrap();
            storage.set_string("nav-theme", "dark").unwrap();
            drop(storage);

            let reopened = FileStorage::open(Some(path.clone())).unwrap();
            assert_eq!(
                reopened.get_string("nav-theme").unwrap().as_deref(),
                Some("dark")
            );
            reopened.set_string("nav-theme", "light").unwrap();
            assert_eq!(
                reopened.get_string("nav-theme").unwrap().as_deref(),
                Some("light")
            );

            let _ = fs::remove_file(&path);
        }

        #[test]
        fn test_file_storage_rejects_corrupt_file() {
            let path = temp_path("corrupt");
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "{not json").unwrap();

            assert!(matches!(
                FileStorage::open(Some(path.clone())),
                Err(StorageError::Json(_))
            ));

            let _ = fs::remove_file(&path);
        }
    }
}

#[cfg(target_arch = "wasm32")]
use web_storage::default_backend;

#[cfg(not(target_arch = "wasm32"))]
use file_storage::default_backend;

/// The platform backend, or [`MemoryStorage`] if it cannot be opened
pub fn default_storage_backend() -> Box<dyn StorageBackend> {
    match default_backend() {
        Ok(backend) => backend,
        Err(e) => {
            tracing::warn!("Persistent storage unavailable, preferences will not be saved: {e}");
            Box::new(MemoryStorage::new())
        }
    }
}

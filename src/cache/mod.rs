//! Read-through directory-listing cache.
//!
//! Keys are `<canonical path>_<disk>` so multiple backends sharing one cache
//! store never collide. Values are the JSON-serialized entry sequence of a
//! whole directory listing; mutations always invalidate and rebuild whole
//! directories, never patch incrementally.
//!
//! The cache is never a correctness dependency: any store failure (or a
//! payload that no longer decodes) degrades to a direct backend query and is
//! logged at `warn`.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::backend::StorageBackend;
use crate::entry::Entry;
use crate::error::Result;
use crate::path::VirtualPath;

pub mod memory;

pub use memory::MemoryCacheStore;

/// Byte-level cache store surface (a Redis server in the source deployment).
pub trait CacheStore: Send + Sync {
    fn exists(&self, key: &str) -> Result<bool>;

    /// `None` for absent or expired keys.
    fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>>;

    fn store(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()>;

    /// Idempotent delete.
    fn forget(&self, key: &str) -> Result<()>;
}

pub struct DirectoryCache {
    store: Option<Arc<dyn CacheStore>>,
    disk: String,
    ttl: Duration,
}

impl std::fmt::Debug for DirectoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryCache")
            .field("disk", &self.disk)
            .field("enabled", &self.store.is_some())
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl DirectoryCache {
    pub fn new(store: Arc<dyn CacheStore>, disk: String, ttl: Duration) -> Self {
        Self {
            store: Some(store),
            disk,
            ttl,
        }
    }

    /// A cache that forwards every read straight to the backend.
    pub fn disabled(disk: String) -> Self {
        Self {
            store: None,
            disk,
            ttl: Duration::ZERO,
        }
    }

    pub fn enabled(&self) -> bool {
        self.store.is_some()
    }

    fn key(&self, path: &VirtualPath) -> String {
        format!("{}_{}", path.as_str(), self.disk)
    }

    /// Read-through get: serve a fresh key from the store, fall back to a
    /// live backend listing (re-storing it) otherwise.
    pub fn get(
        &self,
        backend: &dyn StorageBackend,
        path: &VirtualPath,
        recursive: bool,
    ) -> Result<Vec<Entry>> {
        let Some(store) = &self.store else {
            return backend.list_contents(path, recursive);
        };
        let key = self.key(path);
        match store.exists(&key) {
            Ok(true) => match store.fetch(&key) {
                Ok(Some(bytes)) => match serde_json::from_slice::<Vec<Entry>>(&bytes) {
                    Ok(entries) => return Ok(entries),
                    Err(err) => {
                        warn!(%path, error = %err, "cached listing no longer decodes; rebuilding");
                        let _ = store.forget(&key);
                    }
                },
                Ok(None) => {}
                Err(err) => {
                    warn!(%path, error = %err, "cache fetch failed; querying backend directly");
                }
            },
            Ok(false) => {}
            Err(err) => {
                warn!(%path, error = %err, "cache probe failed; querying backend directly");
            }
        }
        self.rebuild(backend, path, recursive)
    }

    /// Idempotent invalidation. Store failures are logged and swallowed.
    pub fn invalidate(&self, path: &VirtualPath) {
        if let Some(store) = &self.store {
            if let Err(err) = store.forget(&self.key(path)) {
                warn!(%path, error = %err, "cache invalidation failed");
            }
        }
    }

    /// Query the backend live and re-store the listing. Store failures are
    /// logged and swallowed; the live listing is returned either way.
    pub fn rebuild(
        &self,
        backend: &dyn StorageBackend,
        path: &VirtualPath,
        recursive: bool,
    ) -> Result<Vec<Entry>> {
        let entries = backend.list_contents(path, recursive)?;
        if let Some(store) = &self.store {
            match serde_json::to_vec(&entries) {
                Ok(bytes) => {
                    if let Err(err) = store.store(&self.key(path), &bytes, self.ttl) {
                        warn!(%path, error = %err, "cache store failed");
                    }
                }
                Err(err) => {
                    warn!(%path, error = %err, "listing serialization failed; not cached");
                }
            }
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    fn sixty_second_cache() -> DirectoryCache {
        DirectoryCache::new(
            Arc::new(MemoryCacheStore::new()),
            "local".to_string(),
            Duration::from_secs(60),
        )
    }

    #[test]
    fn second_get_within_ttl_hits_cache() {
        let backend = MemoryBackend::new();
        backend
            .put(&VirtualPath::canonicalize("/docs/a.txt"), b"a")
            .expect("put");
        let cache = sixty_second_cache();
        let root = VirtualPath::root();

        let first = cache.get(&backend, &root, false).expect("get");
        let second = cache.get(&backend, &root, false).expect("get");
        assert_eq!(first, second);
        assert_eq!(backend.list_calls(), 1);
    }

    #[test]
    fn get_after_invalidate_rebuilds_exactly_once() {
        let backend = MemoryBackend::new();
        backend
            .put(&VirtualPath::canonicalize("/docs/a.txt"), b"a")
            .expect("put");
        let cache = sixty_second_cache();
        let root = VirtualPath::root();

        cache.get(&backend, &root, false).expect("warm");
        cache.invalidate(&root);
        let rebuilt = cache.get(&backend, &root, false).expect("get");
        assert_eq!(backend.list_calls(), 2);

        let direct = backend.list_contents(&root, false).expect("list");
        assert_eq!(rebuilt, direct);
        assert_eq!(backend.list_calls(), 3);
    }

    #[test]
    fn invalidate_is_idempotent() {
        let cache = sixty_second_cache();
        let root = VirtualPath::root();
        cache.invalidate(&root);
        cache.invalidate(&root);
    }

    #[test]
    fn disabled_cache_always_queries_backend() {
        let backend = MemoryBackend::new();
        let cache = DirectoryCache::disabled("local".to_string());
        let root = VirtualPath::root();
        cache.get(&backend, &root, false).expect("get");
        cache.get(&backend, &root, false).expect("get");
        assert_eq!(backend.list_calls(), 2);
    }

    #[test]
    fn expired_key_is_treated_as_absent() {
        let backend = MemoryBackend::new();
        backend
            .put(&VirtualPath::canonicalize("/a.txt"), b"a")
            .expect("put");
        let cache = DirectoryCache::new(
            Arc::new(MemoryCacheStore::new()),
            "local".to_string(),
            Duration::ZERO,
        );
        let root = VirtualPath::root();
        cache.get(&backend, &root, false).expect("get");
        cache.get(&backend, &root, false).expect("get");
        assert_eq!(backend.list_calls(), 2);
    }

    #[test]
    fn keys_are_namespaced_by_disk() {
        let store: Arc<dyn CacheStore> = Arc::new(MemoryCacheStore::new());
        let backend_a = MemoryBackend::new();
        backend_a
            .put(&VirtualPath::canonicalize("/only-a.txt"), b"a")
            .expect("put");
        let backend_b = MemoryBackend::new();

        let cache_a = DirectoryCache::new(store.clone(), "a".to_string(), Duration::from_secs(60));
        let cache_b = DirectoryCache::new(store, "b".to_string(), Duration::from_secs(60));
        let root = VirtualPath::root();

        let from_a = cache_a.get(&backend_a, &root, false).expect("get");
        let from_b = cache_b.get(&backend_b, &root, false).expect("get");
        assert_eq!(from_a.len(), 1);
        assert!(from_b.is_empty());
    }
}

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use dir_manager::backend::MemoryBackend;
use dir_manager::cache::MemoryCacheStore;
use dir_manager::permission::{Access, MemoryPermissionStore, PermissionGrant};
use dir_manager::{Context, EntryKind, ManagerConfig, VirtualPath};

pub const DISK: &str = "local";

pub fn put(backend: &MemoryBackend, path: &str, content: &[u8]) {
    use dir_manager::backend::StorageBackend;
    backend
        .put(&VirtualPath::canonicalize(path), content)
        .expect("seed put");
}

pub fn mkdir(backend: &MemoryBackend, path: &str) {
    use dir_manager::backend::StorageBackend;
    backend
        .create_dir(&VirtualPath::canonicalize(path))
        .expect("seed mkdir");
}

pub fn has(backend: &MemoryBackend, path: &str) -> bool {
    use dir_manager::backend::StorageBackend;
    backend
        .has(&VirtualPath::canonicalize(path))
        .expect("has")
}

pub fn read(backend: &MemoryBackend, path: &str) -> Vec<u8> {
    use dir_manager::backend::StorageBackend;
    backend
        .read(&VirtualPath::canonicalize(path))
        .expect("read")
}

pub fn grant(path: &str, access: &[Access], has_all: bool) -> PermissionGrant {
    PermissionGrant {
        disk: DISK.to_string(),
        path: VirtualPath::canonicalize(path),
        access: access.iter().copied().collect::<BTreeSet<_>>(),
        kind: EntryKind::Dir,
        has_all,
    }
}

/// Context without caching or enforcement.
pub fn context(backend: Arc<MemoryBackend>) -> Context {
    Context::new(
        ManagerConfig::new(DISK),
        backend,
        None,
        Arc::new(MemoryPermissionStore::new()),
    )
    .expect("context")
}

/// Context with an in-memory cache store and a 60s TTL.
pub fn cached_context(backend: Arc<MemoryBackend>) -> Context {
    Context::new(
        ManagerConfig::new(DISK).with_cache(60),
        backend,
        Some(Arc::new(MemoryCacheStore::new())),
        Arc::new(MemoryPermissionStore::new()),
    )
    .expect("context")
}

/// Context with deny-all enforcement backed by the given grants.
pub fn enforced_context(backend: Arc<MemoryBackend>, grants: Vec<PermissionGrant>) -> Context {
    let store = MemoryPermissionStore::new();
    for entry in grants {
        use dir_manager::permission::PermissionStore;
        store.insert(entry).expect("insert grant");
    }
    Context::new(
        ManagerConfig::new(DISK).with_deny_all(),
        backend,
        None,
        Arc::new(store),
    )
    .expect("context")
}

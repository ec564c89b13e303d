//! Operation orchestration.
//!
//! Every operation is a free function taking `(&Context, Request)`; the
//! [`Context`] bundles the backend, the listing cache, the permission filter
//! and configuration, so nothing is resolved ad hoc inside business logic.
//! Authorization happens once at each operation boundary. Mutating responses
//! carry their domain events for an external dispatcher.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::backend::StorageBackend;
use crate::cache::DirectoryCache;
use crate::config::ManagerConfig;
use crate::path::VirtualPath;
use crate::permission::PermissionFilter;

mod browse;
mod context;
mod copy_move;
mod create;
mod read;
mod remove;
mod rename;
mod write;

pub use browse::{
    breadcrumbs, browse, scope_contains, tree_view, Breadcrumb, BreadcrumbsRequest,
    BreadcrumbsResponse, BrowseRequest, BrowseResponse, TreeRequest, TreeResponse,
};
pub use copy_move::{
    copy_items, move_items, CopyDirOutcome, PasteItem, PasteRequest, PasteResponse,
};
pub use create::{create, CreateRequest, CreateResponse};
pub use read::{download, read_file, Download, DownloadRequest, ReadRequest, ReadResponse};
pub use remove::{remove, RemoveItem, RemoveRequest, RemoveResponse};
pub use rename::{rename, RenameRequest, RenameResponse};
pub use write::{store, write_file, StoreRequest, StoreResponse, WriteRequest, WriteResponse};

pub struct Context {
    backend: Arc<dyn StorageBackend>,
    cache: DirectoryCache,
    permissions: PermissionFilter,
    config: ManagerConfig,
    locks: PathLocks,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("disk", &self.config.disk)
            .field("cache", &self.cache)
            .field("permissions", &self.permissions)
            .finish_non_exhaustive()
    }
}

/// Cooperative cancellation handle for recursive copy/move.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One failed item of a batch operation; the batch continues past it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemFailure {
    pub path: VirtualPath,
    pub error: String,
}

/// Per-normalized-path mutual exclusion around mutation + cache
/// invalidate/rebuild sequences. Without it two writers can interleave an
/// invalidate-then-rebuild pair and re-store a listing that predates the
/// other writer's mutation.
#[derive(Default)]
struct PathLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl PathLocks {
    /// Lock handles for the given keys, deduplicated and sorted so callers
    /// always acquire in a global order.
    fn handles(&self, mut keys: Vec<String>) -> Vec<Arc<Mutex<()>>> {
        keys.sort();
        keys.dedup();
        let mut table = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        keys.into_iter()
            .map(|key| Arc::clone(table.entry(key).or_default()))
            .collect()
    }
}

/// Acquire every handle in order; hold the returned guards for the whole
/// mutation + cache refresh.
pub(crate) fn lock_all(handles: &[Arc<Mutex<()>>]) -> Vec<MutexGuard<'_, ()>> {
    handles
        .iter()
        .map(|handle| handle.lock().unwrap_or_else(PoisonError::into_inner))
        .collect()
}

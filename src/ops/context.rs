use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::warn;

use crate::backend::StorageBackend;
use crate::cache::{CacheStore, DirectoryCache};
use crate::config::ManagerConfig;
use crate::error::{Error, Result};
use crate::path::VirtualPath;
use crate::permission::{Access, PermissionFilter, PermissionStore};

use super::{
    BreadcrumbsRequest, BreadcrumbsResponse, BrowseRequest, BrowseResponse, Context,
    CreateRequest, CreateResponse, Download, DownloadRequest, PasteRequest, PasteResponse,
    PathLocks, ReadRequest, ReadResponse, RemoveRequest, RemoveResponse, RenameRequest,
    RenameResponse, StoreRequest, StoreResponse, TreeRequest, TreeResponse, WriteRequest,
    WriteResponse,
};

impl Context {
    /// Validate the config and wire the dependency bundle. The cache store is
    /// optional; it is only consulted when the config enables caching.
    pub fn new(
        config: ManagerConfig,
        backend: Arc<dyn StorageBackend>,
        cache_store: Option<Arc<dyn CacheStore>>,
        permission_store: Arc<dyn PermissionStore>,
    ) -> Result<Self> {
        config.validate()?;
        let cache = match (config.cache.enabled, cache_store) {
            (true, Some(store)) => DirectoryCache::new(
                store,
                config.disk.clone(),
                Duration::from_secs(config.cache.ttl_secs),
            ),
            (true, None) => {
                return Err(Error::InvalidConfig(
                    "cache is enabled but no cache store was provided".to_string(),
                ));
            }
            (false, _) => DirectoryCache::disabled(config.disk.clone()),
        };
        let permissions = PermissionFilter::new(
            permission_store,
            config.disk.clone(),
            config.deny_all,
        );
        Ok(Self {
            backend,
            cache,
            permissions,
            config,
            locks: PathLocks::default(),
        })
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn disk(&self) -> &str {
        &self.config.disk
    }

    /// Single typed allow/deny decision per operation.
    pub(super) fn authorize(&self, access: Access, path: &VirtualPath) -> Result<()> {
        if self.permissions.allows(access, path)? {
            Ok(())
        } else {
            Err(Error::PermissionDenied {
                access,
                path: path.clone(),
            })
        }
    }

    /// Lock handles covering the given directories, namespaced by disk.
    pub(super) fn mutation_locks(&self, paths: &[&VirtualPath]) -> Vec<Arc<Mutex<()>>> {
        let keys = paths
            .iter()
            .map(|path| format!("{}:{}", self.config.disk, path.as_str()))
            .collect();
        self.locks.handles(keys)
    }

    /// Invalidate and eagerly rebuild one directory listing. The mutation has
    /// already happened, so a rebuild failure only costs freshness.
    pub(super) fn refresh_listing(&self, path: &VirtualPath) {
        self.cache.invalidate(path);
        if !self.cache.enabled() {
            return;
        }
        if let Err(err) = self.cache.rebuild(self.backend.as_ref(), path, false) {
            warn!(%path, error = %err, "cache rebuild after mutation failed");
        }
    }

    pub fn browse(&self, request: BrowseRequest) -> Result<BrowseResponse> {
        super::browse(self, request)
    }

    pub fn tree_view(&self, request: TreeRequest) -> Result<TreeResponse> {
        super::tree_view(self, request)
    }

    pub fn breadcrumbs(&self, request: BreadcrumbsRequest) -> Result<BreadcrumbsResponse> {
        super::breadcrumbs(self, request)
    }

    pub fn create(&self, request: CreateRequest) -> Result<CreateResponse> {
        super::create(self, request)
    }

    pub fn copy_items(&self, request: PasteRequest) -> Result<PasteResponse> {
        super::copy_items(self, request)
    }

    pub fn move_items(&self, request: PasteRequest) -> Result<PasteResponse> {
        super::move_items(self, request)
    }

    pub fn rename(&self, request: RenameRequest) -> Result<RenameResponse> {
        super::rename(self, request)
    }

    pub fn remove(&self, request: RemoveRequest) -> Result<RemoveResponse> {
        super::remove(self, request)
    }

    pub fn store(&self, request: StoreRequest) -> Result<StoreResponse> {
        super::store(self, request)
    }

    pub fn write_file(&self, request: WriteRequest) -> Result<WriteResponse> {
        super::write_file(self, request)
    }

    pub fn read_file(&self, request: ReadRequest) -> Result<ReadResponse> {
        super::read_file(self, request)
    }

    pub fn download(&self, request: DownloadRequest) -> Result<Download> {
        super::download(self, request)
    }
}

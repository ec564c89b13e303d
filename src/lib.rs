//! `dir-manager` exposes a hierarchical view over a pluggable storage
//! backend and lets callers browse, create, copy, move, rename, and delete
//! files/directories through a normalized virtual path space.
//!
//! Directory listings are served through a read-through, TTL-bound cache and
//! filtered against an external permission source; every mutation resolves
//! naming collisions, refreshes the affected listing caches, and returns its
//! domain events for an external dispatcher.
//!
//! The crate is the orchestration core only: storage backends, the
//! permission store's persistence, the cache server, and event delivery are
//! external capabilities behind the [`backend::StorageBackend`],
//! [`permission::PermissionStore`], and [`cache::CacheStore`] traits.

pub mod backend;
pub mod cache;
mod config;
mod entry;
mod error;
pub mod events;
pub mod ops;
pub mod path;
pub mod permission;
pub mod telemetry;
pub mod tree;

pub use config::{CacheConfig, ManagerConfig};
pub use entry::{Entry, EntryKind};
pub use error::{Error, Result, Status};
pub use events::{Event, PasteMode};
pub use path::VirtualPath;

pub use ops::{
    breadcrumbs, browse, copy_items, create, download, move_items, read_file, remove, rename,
    scope_contains, store, tree_view, write_file, Breadcrumb, BreadcrumbsRequest,
    BreadcrumbsResponse, BrowseRequest, BrowseResponse, CancelToken, Context, CopyDirOutcome,
    CreateRequest, CreateResponse, Download, DownloadRequest, ItemFailure, PasteItem,
    PasteRequest, PasteResponse, ReadRequest, ReadResponse, RemoveItem, RemoveRequest,
    RemoveResponse, RenameRequest, RenameResponse, StoreRequest, StoreResponse, TreeRequest,
    TreeResponse, WriteRequest, WriteResponse,
};

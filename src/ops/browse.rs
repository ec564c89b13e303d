use serde::{Deserialize, Serialize};

use crate::entry::{Entry, EntryKind};
use crate::error::{Error, Result};
use crate::path::VirtualPath;
use crate::tree::{self, Node};

use super::Context;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowseRequest {
    pub path: String,
    /// Opting out invalidates the key first, forcing one fresh rebuild.
    #[serde(default = "default_true")]
    pub use_cache: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowseResponse {
    pub path: VirtualPath,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeRequest {
    pub path: String,
    #[serde(default = "default_true")]
    pub recursive: bool,
    /// Restrict the tree to one entry kind (the move-target picker only
    /// wants directories).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<EntryKind>,
    /// Bypass the cache entirely: neither read nor re-store.
    #[serde(default)]
    pub bypass_cache: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeResponse {
    pub path: VirtualPath,
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreadcrumbsRequest {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreadcrumbsResponse {
    pub crumbs: Vec<Breadcrumb>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub name: String,
    pub path: VirtualPath,
}

const fn default_true() -> bool {
    true
}

/// Permission-filtered flat listing of one directory, with the synthetic
/// `..` entry prepended. The filter intersects by exact path; the back entry
/// is added afterwards and is never subject to filtering or caching.
pub fn browse(ctx: &Context, request: BrowseRequest) -> Result<BrowseResponse> {
    let path = VirtualPath::canonicalize(&request.path);
    if !request.use_cache {
        ctx.cache.invalidate(&path);
    }
    let mut entries = ctx.cache.get(ctx.backend.as_ref(), &path, false)?;

    if ctx.permissions.is_enforced() {
        let allowed = ctx.permissions.allowed_paths(&path)?;
        entries.retain(|entry| allowed.contains(&entry.path));
    }

    entries.insert(0, Entry::back(path.parent()));
    Ok(BrowseResponse { path, entries })
}

/// Nested node view fed by a single listing query.
pub fn tree_view(ctx: &Context, request: TreeRequest) -> Result<TreeResponse> {
    let path = VirtualPath::canonicalize(&request.path);
    let entries = if request.bypass_cache {
        ctx.backend.list_contents(&path, request.recursive)?
    } else {
        ctx.cache.get(ctx.backend.as_ref(), &path, request.recursive)?
    };
    let entries = match request.kind {
        Some(EntryKind::Back) => {
            return Err(Error::Validation(
                "tree filter must be file or dir".to_string(),
            ));
        }
        Some(kind) => tree::filter_by_kind(&entries, kind),
        None => entries,
    };
    let nodes = tree::build_tree(&entries, &path);
    Ok(TreeResponse { path, nodes })
}

/// Root-first ancestor chain: `Home`, each ancestor, then the path itself.
pub fn breadcrumbs(_ctx: &Context, request: BreadcrumbsRequest) -> Result<BreadcrumbsResponse> {
    let path = VirtualPath::canonicalize(&request.path);
    let crumbs = path
        .lineage()
        .into_iter()
        .map(|ancestor| Breadcrumb {
            name: if ancestor.is_root() {
                "Home".to_string()
            } else {
                ancestor.base_name().to_string()
            },
            path: ancestor,
        })
        .collect();
    Ok(BreadcrumbsResponse { crumbs })
}

/// A requested scope root is only valid for a directory when it is the
/// directory itself or one of its ancestors.
pub fn scope_contains(scope: &VirtualPath, dir: &VirtualPath) -> bool {
    dir.lineage().contains(scope)
}

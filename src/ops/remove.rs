use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::entry::EntryKind;
use crate::error::{Error, Result};
use crate::events::Event;
use crate::path::VirtualPath;
use crate::permission::Access;

use super::{Context, ItemFailure};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveItem {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveRequest {
    pub items: Vec<RemoveItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveResponse {
    pub removed: Vec<VirtualPath>,
    pub failed: Vec<ItemFailure>,
    #[serde(skip)]
    pub events: Vec<Event>,
}

/// Batch removal. The whole batch is validated and authorized before any
/// backend call: one malformed entry aborts with zero side effects. File
/// deletions go to the backend as a single batched call; directories are
/// deleted individually and per-item failures keep the rest of the batch
/// going. Every removed item's parent listing is refreshed exactly once.
pub fn remove(ctx: &Context, request: RemoveRequest) -> Result<RemoveResponse> {
    if request.items.is_empty() {
        return Err(Error::Validation("remove batch is empty".to_string()));
    }

    let mut files = Vec::new();
    let mut dirs = Vec::new();
    for item in &request.items {
        let path = VirtualPath::canonicalize(&item.path);
        if path.is_root() {
            return Err(Error::Validation("refusing to remove the root".to_string()));
        }
        match item.kind {
            EntryKind::File => files.push(path),
            EntryKind::Dir => dirs.push(path),
            EntryKind::Back => {
                return Err(Error::Validation(
                    "removed entry must be a file or dir".to_string(),
                ));
            }
        }
    }
    for path in files.iter().chain(dirs.iter()) {
        ctx.authorize(Access::Write, path)?;
    }

    let parents: BTreeSet<VirtualPath> = files
        .iter()
        .chain(dirs.iter())
        .map(VirtualPath::parent)
        .collect();
    let parent_refs: Vec<&VirtualPath> = parents.iter().collect();
    let handles = ctx.mutation_locks(&parent_refs);
    let _guards = super::lock_all(&handles);

    let mut removed = Vec::new();
    let mut failed = Vec::new();

    if !files.is_empty() {
        match ctx.backend.delete_many(&files) {
            Ok(()) => removed.extend(files.iter().cloned()),
            Err(err) => {
                let error = err.to_string();
                failed.extend(files.iter().map(|path| ItemFailure {
                    path: path.clone(),
                    error: error.clone(),
                }));
            }
        }
    }
    for dir in &dirs {
        match ctx.backend.delete_dir(dir) {
            Ok(()) => removed.push(dir.clone()),
            Err(err) => failed.push(ItemFailure {
                path: dir.clone(),
                error: err.to_string(),
            }),
        }
    }

    // Refresh the parent of every removed item, each parent once.
    let touched: BTreeSet<VirtualPath> = removed.iter().map(VirtualPath::parent).collect();
    for parent in &touched {
        ctx.refresh_listing(parent);
    }

    let events = if removed.is_empty() {
        Vec::new()
    } else {
        vec![Event::Deleted {
            paths: removed.clone(),
            disk: ctx.disk().to_string(),
        }]
    };

    Ok(RemoveResponse {
        removed,
        failed,
        events,
    })
}

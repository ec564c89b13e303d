use serde::{Deserialize, Serialize};

use crate::entry::EntryKind;
use crate::error::{Error, Result};
use crate::events::Event;
use crate::path::{self, VirtualPath, SEPARATOR};
use crate::permission::Access;

use super::Context;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRequest {
    /// Directory the new entry is created under.
    pub path: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateResponse {
    /// Final (possibly upcounted) path of the created entry.
    pub path: VirtualPath,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(skip)]
    pub events: Vec<Event>,
}

pub(super) fn validate_leaf_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Validation("name is empty".to_string()));
    }
    if name.contains(SEPARATOR) {
        return Err(Error::Validation(format!(
            "name {name:?} must not contain the separator"
        )));
    }
    if name == "." || name == ".." {
        return Err(Error::Validation(format!("invalid name {name:?}")));
    }
    Ok(())
}

pub fn create(ctx: &Context, request: CreateRequest) -> Result<CreateResponse> {
    let kind = match request.kind {
        EntryKind::File | EntryKind::Dir => request.kind,
        EntryKind::Back => {
            return Err(Error::Validation(
                "created entry must be a file or dir".to_string(),
            ));
        }
    };
    validate_leaf_name(&request.name)?;

    let parent = VirtualPath::canonicalize(&request.path);
    ctx.authorize(Access::Create, &parent)?;

    let handles = ctx.mutation_locks(&[&parent]);
    let _guards = super::lock_all(&handles);

    let candidate = parent.join(&request.name);
    let destination = match kind {
        EntryKind::Dir => resolve_free_dir_name(ctx, candidate)?,
        _ => resolve_free_file_name(ctx, candidate)?,
    };

    match kind {
        EntryKind::Dir => ctx.backend.create_dir(&destination)?,
        _ => ctx.backend.put(&destination, b"")?,
    }
    ctx.refresh_listing(&parent);

    let name = destination.base_name().to_string();
    let event = match kind {
        EntryKind::Dir => Event::DirectoryCreated {
            name,
            parent: parent.clone(),
            disk: ctx.disk().to_string(),
        },
        _ => Event::FileCreated {
            name,
            parent: parent.clone(),
            disk: ctx.disk().to_string(),
        },
    };

    Ok(CreateResponse {
        path: destination,
        kind,
        events: vec![event],
    })
}

pub(super) fn resolve_free_file_name(
    ctx: &Context,
    candidate: VirtualPath,
) -> Result<VirtualPath> {
    let mut current = candidate;
    while ctx.backend.has(&current)? {
        current = path::upcount_name(&current);
    }
    Ok(current)
}

/// A directory destination counts as taken when the name exists at all or a
/// listing under it is non-empty (object stores only materialize prefixes
/// that have contents).
pub(super) fn resolve_free_dir_name(ctx: &Context, candidate: VirtualPath) -> Result<VirtualPath> {
    let mut current = candidate;
    while ctx.backend.has(&current)? || !ctx.backend.list_contents(&current, true)?.is_empty() {
        current = path::upcount_name(&current);
    }
    Ok(current)
}

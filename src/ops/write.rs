use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::events::Event;
use crate::path::VirtualPath;
use crate::permission::Access;

use super::Context;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreRequest {
    /// Directory the upload lands in.
    pub path: String,
    pub name: String,
    pub content: Vec<u8>,
    /// Replace an existing file of the same name instead of upcounting.
    /// Overwrite is only honored here, on the plain store path.
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreResponse {
    pub path: VirtualPath,
    pub size: u64,
    pub overwritten: bool,
    #[serde(skip)]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteRequest {
    /// Full path of the file whose content is replaced.
    pub path: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteResponse {
    pub path: VirtualPath,
    pub size: u64,
}

/// Upload entry point. Spaces in the uploaded name are replaced with
/// underscores before the collision probe.
pub fn store(ctx: &Context, request: StoreRequest) -> Result<StoreResponse> {
    let name = request.name.replace(' ', "_");
    super::create::validate_leaf_name(&name)?;

    let dir = VirtualPath::canonicalize(&request.path);
    ctx.authorize(Access::Write, &dir)?;

    let handles = ctx.mutation_locks(&[&dir]);
    let _guards = super::lock_all(&handles);

    let mut destination = dir.join(&name);
    let mut overwritten = false;
    if ctx.backend.has(&destination)? {
        if request.overwrite {
            ctx.backend.delete(&destination)?;
            overwritten = true;
        } else {
            destination = super::create::resolve_free_file_name(ctx, destination)?;
        }
    }

    let size = ctx
        .backend
        .put_stream(&destination, &mut std::io::Cursor::new(&request.content))?;
    ctx.refresh_listing(&dir);

    let event = Event::FilesUploaded {
        path: destination.clone(),
        disk: ctx.disk().to_string(),
    };

    Ok(StoreResponse {
        path: destination,
        size,
        overwritten,
        events: vec![event],
    })
}

/// Replace the content of an existing file in place. Listing-cache entries
/// are metadata-only and are left untouched by content writes.
pub fn write_file(ctx: &Context, request: WriteRequest) -> Result<WriteResponse> {
    let path = VirtualPath::canonicalize(&request.path);
    if path.is_root() {
        return Err(Error::Validation("cannot write to the root".to_string()));
    }
    ctx.authorize(Access::Write, &path)?;

    let size = ctx
        .backend
        .put_stream(&path, &mut std::io::Cursor::new(&request.content))?;

    Ok(WriteResponse { path, size })
}

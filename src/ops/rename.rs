use serde::{Deserialize, Serialize};

use crate::entry::EntryKind;
use crate::error::{Error, Result};
use crate::events::Event;
use crate::path::VirtualPath;
use crate::permission::Access;

use super::Context;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameRequest {
    /// Current full path of the entry.
    pub path: String,
    pub old_name: String,
    pub new_name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameResponse {
    /// Final (possibly upcounted) path under the new name.
    pub path: VirtualPath,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(skip)]
    pub events: Vec<Event>,
}

/// Rename one entry in place. Files use the backend rename primitive.
/// Directories use the backend's native recursive move when advertised and
/// otherwise replicate the subtree under the new name before deleting the
/// old one.
pub fn rename(ctx: &Context, request: RenameRequest) -> Result<RenameResponse> {
    let kind = match request.kind {
        EntryKind::File | EntryKind::Dir => request.kind,
        EntryKind::Back => {
            return Err(Error::Validation(
                "renamed entry must be a file or dir".to_string(),
            ));
        }
    };
    super::create::validate_leaf_name(&request.new_name)?;

    let path = VirtualPath::canonicalize(&request.path);
    if path.is_root() {
        return Err(Error::Validation("refusing to rename the root".to_string()));
    }
    ctx.authorize(Access::Write, &path)?;

    let parent = path.parent();
    let handles = ctx.mutation_locks(&[&parent]);
    let _guards = super::lock_all(&handles);

    let new_path = match kind {
        EntryKind::Dir => {
            let destination =
                super::create::resolve_free_dir_name(ctx, parent.join(&request.new_name))?;
            match ctx.backend.native_recursive() {
                Some(native) => native.move_dir(&path, &destination)?,
                None => {
                    let report =
                        super::copy_move::replicate_subtree(ctx, &path, &destination, None)?;
                    // The old subtree must stay intact unless every entry
                    // made it to the new name.
                    if let Some(failure) = report.failures.first() {
                        return Err(Error::backend(
                            "replicate",
                            &failure.path,
                            std::io::Error::new(std::io::ErrorKind::Other, failure.error.clone()),
                        ));
                    }
                    ctx.backend.delete_dir(&path)?;
                }
            }
            destination
        }
        _ => {
            let destination =
                super::create::resolve_free_file_name(ctx, parent.join(&request.new_name))?;
            ctx.backend.rename(&path, &destination)?;
            destination
        }
    };

    ctx.refresh_listing(&parent);

    let event = Event::Rename {
        old_name: request.old_name,
        new_name: new_path.base_name().to_string(),
        path,
        kind,
        disk: ctx.disk().to_string(),
    };

    Ok(RenameResponse {
        path: new_path,
        kind,
        events: vec![event],
    })
}

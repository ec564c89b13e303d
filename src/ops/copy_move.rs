use serde::{Deserialize, Serialize};

use crate::entry::EntryKind;
use crate::error::{Error, Result};
use crate::events::{Event, PasteMode};
use crate::path::VirtualPath;
use crate::permission::Access;

use super::{CancelToken, Context, ItemFailure};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasteItem {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasteRequest {
    pub items: Vec<PasteItem>,
    pub destination: String,
    /// Cooperative cancellation; checked between items and between subtree
    /// entries.
    #[serde(skip)]
    pub cancel: Option<CancelToken>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasteResponse {
    pub destination: VirtualPath,
    pub operation: PasteMode,
    /// Final (possibly upcounted) destination of every completed item.
    pub completed: Vec<VirtualPath>,
    pub failed: Vec<ItemFailure>,
    pub cancelled: bool,
    /// Entries touched across all recursive replications.
    pub entries_processed: usize,
    #[serde(skip)]
    pub events: Vec<Event>,
}

/// Outcome of one recursive directory transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyDirOutcome {
    pub destination: VirtualPath,
    pub entries_processed: usize,
    pub cancelled: bool,
    /// Whether the backend's native recursive operation handled the subtree
    /// atomically (no per-entry progress in that case).
    pub native: bool,
    pub failures: Vec<ItemFailure>,
}

pub fn copy_items(ctx: &Context, request: PasteRequest) -> Result<PasteResponse> {
    paste(ctx, request, PasteMode::Copy)
}

pub fn move_items(ctx: &Context, request: PasteRequest) -> Result<PasteResponse> {
    paste(ctx, request, PasteMode::Move)
}

fn paste(ctx: &Context, request: PasteRequest, operation: PasteMode) -> Result<PasteResponse> {
    let destination = VirtualPath::canonicalize(&request.destination);
    ctx.authorize(Access::Write, &destination)?;

    let mut completed = Vec::new();
    let mut failed = Vec::new();
    let mut events = Vec::new();
    let mut entries_processed = 0;
    let mut cancelled = false;

    for item in &request.items {
        if request.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            cancelled = true;
            break;
        }
        let source = VirtualPath::canonicalize(&item.path);
        match item.kind {
            EntryKind::File => match transfer_file(ctx, &source, &destination, operation) {
                Ok((final_path, event)) => {
                    completed.push(final_path);
                    events.push(event);
                }
                Err(err) => failed.push(ItemFailure {
                    path: source,
                    error: err.to_string(),
                }),
            },
            EntryKind::Dir => {
                match transfer_dir(ctx, &source, &destination, operation, request.cancel.as_ref())
                {
                    Ok((outcome, event)) => {
                        entries_processed += outcome.entries_processed;
                        if outcome.cancelled {
                            cancelled = true;
                        }
                        failed.extend(outcome.failures.iter().cloned());
                        completed.push(outcome.destination);
                        events.push(event);
                        if outcome.cancelled {
                            break;
                        }
                    }
                    Err(err) => failed.push(ItemFailure {
                        path: source,
                        error: err.to_string(),
                    }),
                }
            }
            EntryKind::Back => failed.push(ItemFailure {
                path: source,
                error: "item must be a file or dir".to_string(),
            }),
        }
    }

    Ok(PasteResponse {
        destination,
        operation,
        completed,
        failed,
        cancelled,
        entries_processed,
        events,
    })
}

/// Copy or move one file under `dest_dir`, upcounting on collision.
pub(super) fn transfer_file(
    ctx: &Context,
    src: &VirtualPath,
    dest_dir: &VirtualPath,
    operation: PasteMode,
) -> Result<(VirtualPath, Event)> {
    if src.is_root() {
        return Err(Error::Validation("refusing to paste the root".to_string()));
    }
    let src_parent = src.parent();
    let handles = ctx.mutation_locks(&[&src_parent, dest_dir]);
    let _guards = super::lock_all(&handles);

    let destination =
        super::create::resolve_free_file_name(ctx, dest_dir.join(src.base_name()))?;
    match operation {
        PasteMode::Copy => ctx.backend.copy(src, &destination)?,
        PasteMode::Move => ctx.backend.rename(src, &destination)?,
    }

    ctx.refresh_listing(&src_parent);
    if src_parent != *dest_dir {
        ctx.refresh_listing(dest_dir);
    }

    let event = Event::Paste {
        operation,
        from: src.clone(),
        to: destination.clone(),
        name: destination.base_name().to_string(),
        kind: EntryKind::File,
        disk: ctx.disk().to_string(),
    };
    Ok((destination, event))
}

/// Copy or move a whole subtree under `dest_dir`. Uses the backend's native
/// recursive operation when advertised, otherwise enumerates the source once
/// and replicates it entry by entry. In Move mode the source subtree is only
/// deleted after every copy succeeded.
pub(super) fn transfer_dir(
    ctx: &Context,
    src: &VirtualPath,
    dest_dir: &VirtualPath,
    operation: PasteMode,
    cancel: Option<&CancelToken>,
) -> Result<(CopyDirOutcome, Event)> {
    if src.is_root() {
        return Err(Error::Validation(
            "refusing to paste the root directory".to_string(),
        ));
    }
    if dest_dir.starts_with(src) {
        return Err(Error::Validation(format!(
            "cannot paste {src} into its own subtree {dest_dir}"
        )));
    }

    let src_parent = src.parent();
    let handles = ctx.mutation_locks(&[&src_parent, dest_dir]);
    let _guards = super::lock_all(&handles);

    let real_destination =
        super::create::resolve_free_dir_name(ctx, dest_dir.join(src.base_name()))?;

    let outcome = match ctx.backend.native_recursive() {
        Some(native) => {
            match operation {
                PasteMode::Copy => native.copy_dir(src, &real_destination)?,
                PasteMode::Move => native.move_dir(src, &real_destination)?,
            }
            CopyDirOutcome {
                destination: real_destination.clone(),
                entries_processed: 0,
                cancelled: false,
                native: true,
                failures: Vec::new(),
            }
        }
        None => {
            let report = replicate_subtree(ctx, src, &real_destination, cancel)?;
            if operation == PasteMode::Move && !report.cancelled && report.failures.is_empty() {
                ctx.backend.delete_dir(src)?;
            }
            CopyDirOutcome {
                destination: real_destination.clone(),
                entries_processed: report.processed,
                cancelled: report.cancelled,
                native: false,
                failures: report.failures,
            }
        }
    };

    ctx.refresh_listing(dest_dir);
    if operation == PasteMode::Move && src_parent != *dest_dir {
        ctx.refresh_listing(&src_parent);
    }

    let event = Event::Paste {
        operation,
        from: src.clone(),
        to: real_destination,
        name: src.base_name().to_string(),
        kind: EntryKind::Dir,
        disk: ctx.disk().to_string(),
    };
    Ok((outcome, event))
}

pub(super) struct ReplicaReport {
    pub processed: usize,
    pub failures: Vec<ItemFailure>,
    pub cancelled: bool,
}

/// Generic recursive replication: one source enumeration, directories first
/// (top-down), then file copies. Per-entry failures are collected and the
/// remaining entries continue.
pub(super) fn replicate_subtree(
    ctx: &Context,
    src: &VirtualPath,
    real_destination: &VirtualPath,
    cancel: Option<&CancelToken>,
) -> Result<ReplicaReport> {
    let contents = ctx.backend.list_contents(src, true)?;
    let mut report = ReplicaReport {
        processed: 0,
        failures: Vec::new(),
        cancelled: false,
    };

    if contents.is_empty() {
        ctx.backend.create_dir(real_destination)?;
        return Ok(report);
    }

    for phase in [EntryKind::Dir, EntryKind::File] {
        for entry in contents.iter().filter(|entry| entry.kind == phase) {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                report.cancelled = true;
                return Ok(report);
            }
            let Some(rel) = entry.path.relative_to(src) else {
                continue;
            };
            let target = real_destination.join(rel);
            let result = match phase {
                EntryKind::Dir => ctx.backend.create_dir(&target),
                _ => ctx.backend.copy(&entry.path, &target),
            };
            match result {
                Ok(()) => report.processed += 1,
                Err(err) => report.failures.push(ItemFailure {
                    path: entry.path.clone(),
                    error: err.to_string(),
                }),
            }
        }
    }
    Ok(report)
}

//! Domain events produced by mutations.
//!
//! Operations never deliver events themselves: each successful mutation
//! returns its events (produced after the cache refresh) and a separate
//! dispatcher owns transport.

use serde::{Deserialize, Serialize};

use crate::entry::EntryKind;
use crate::path::VirtualPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasteMode {
    Copy,
    Move,
}

impl std::fmt::Display for PasteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Copy => "copy",
            Self::Move => "move",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    DirectoryCreated {
        name: String,
        parent: VirtualPath,
        disk: String,
    },
    FileCreated {
        name: String,
        parent: VirtualPath,
        disk: String,
    },
    FilesUploaded {
        path: VirtualPath,
        disk: String,
    },
    Rename {
        old_name: String,
        new_name: String,
        path: VirtualPath,
        kind: EntryKind,
        disk: String,
    },
    Paste {
        operation: PasteMode,
        from: VirtualPath,
        to: VirtualPath,
        name: String,
        kind: EntryKind,
        disk: String,
    },
    Deleted {
        paths: Vec<VirtualPath>,
        disk: String,
    },
}

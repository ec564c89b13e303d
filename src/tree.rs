//! One-pass construction of a nested node view from a flat listing.
//!
//! A single recursive backend/cache query feeds the whole tree: entries are
//! grouped by parent directory in memory and directory nodes recurse into the
//! already-fetched groups. Sibling order is the listing order; nothing is
//! re-sorted.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entry::{Entry, EntryKind};
use crate::path::VirtualPath;

/// Transient tree view over a listing. Rebuilt per request; no identity
/// across calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub path: VirtualPath,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Node>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

pub fn build_tree(entries: &[Entry], root: &VirtualPath) -> Vec<Node> {
    let mut by_parent: HashMap<VirtualPath, Vec<&Entry>> = HashMap::new();
    for entry in entries {
        if entry.kind == EntryKind::Back {
            continue;
        }
        by_parent.entry(entry.path.parent()).or_default().push(entry);
    }
    assemble(&by_parent, root)
}

fn assemble(by_parent: &HashMap<VirtualPath, Vec<&Entry>>, dir: &VirtualPath) -> Vec<Node> {
    let Some(group) = by_parent.get(dir) else {
        return Vec::new();
    };
    group
        .iter()
        .map(|entry| {
            let children = match entry.kind {
                EntryKind::Dir => Some(assemble(by_parent, &entry.path)),
                _ => None,
            };
            Node {
                kind: entry.kind,
                path: entry.path.clone(),
                name: entry.name.clone(),
                children,
                extension: entry.extension.clone(),
            }
        })
        .collect()
}

pub fn filter_by_kind(entries: &[Entry], kind: EntryKind) -> Vec<Entry> {
    entries
        .iter()
        .filter(|entry| entry.kind == kind)
        .cloned()
        .collect()
}

use serde::{Deserialize, Serialize};

use crate::path::VirtualPath;

/// One record of a backend directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Dir,
    /// Synthetic parent link prepended to browse listings; never produced by
    /// a backend and never cached.
    Back,
}

impl EntryKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Dir => "dir",
            Self::Back => "back",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub path: VirtualPath,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

impl Entry {
    pub fn file(path: VirtualPath, size: u64, modified: Option<u64>) -> Self {
        let name = path.base_name().to_string();
        let extension = path.extension().map(str::to_string);
        Self {
            kind: EntryKind::File,
            path,
            name,
            size: Some(size),
            modified,
            extension,
        }
    }

    pub fn dir(path: VirtualPath) -> Self {
        let name = path.base_name().to_string();
        Self {
            kind: EntryKind::Dir,
            path,
            name,
            size: None,
            modified: None,
            extension: None,
        }
    }

    /// The `..` parent link shown at the top of a browse listing.
    pub fn back(parent: VirtualPath) -> Self {
        Self {
            kind: EntryKind::Back,
            path: parent,
            name: "..".to_string(),
            size: None,
            modified: None,
            extension: None,
        }
    }
}

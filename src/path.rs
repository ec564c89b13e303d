//! Virtual path handling.
//!
//! Every path the crate touches is a [`VirtualPath`]: a canonical,
//! separator-prefixed string with no traversal segments. This module is
//! intentionally **lexical**: it never touches a backend and never resolves
//! anything against live storage state.
//!
//! Invariants of [`VirtualPath::canonicalize`]:
//! - The result always starts with the separator; the root is the separator
//!   alone.
//! - Repeated separators collapse; `.` segments are dropped.
//! - Any input containing a `..` segment canonicalizes to the root (traversal
//!   is rejected wholesale rather than resolved).
//! - Canonicalization is idempotent.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator of the virtual path space. Backends map this onto their own
/// key/path convention.
pub const SEPARATOR: char = '/';

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VirtualPath(String);

impl VirtualPath {
    pub fn root() -> Self {
        Self(SEPARATOR.to_string())
    }

    /// Canonicalize a raw path string into the virtual path space.
    pub fn canonicalize(raw: &str) -> Self {
        let mut segments = Vec::new();
        for segment in raw.split(SEPARATOR) {
            match segment {
                "" | "." => {}
                ".." => return Self::root(),
                other => segments.push(other),
            }
        }
        if segments.is_empty() {
            return Self::root();
        }
        let mut out = String::with_capacity(raw.len() + 1);
        for segment in segments {
            out.push(SEPARATOR);
            out.push_str(segment);
        }
        Self(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    /// Parent directory; the root is its own parent.
    pub fn parent(&self) -> Self {
        if self.is_root() {
            return self.clone();
        }
        match self.0.rfind(SEPARATOR) {
            Some(0) | None => Self::root(),
            Some(idx) => Self(self.0[..idx].to_string()),
        }
    }

    /// Final segment; the root's base name is the separator itself.
    pub fn base_name(&self) -> &str {
        if self.is_root() {
            return &self.0;
        }
        match self.0.rfind(SEPARATOR) {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    /// Append a (possibly multi-segment) relative part, re-canonicalizing.
    pub fn join(&self, part: &str) -> Self {
        Self::canonicalize(&format!("{}{}{}", self.0, SEPARATOR, part))
    }

    /// Extension of the final segment, excluding the dot. Dot-files have no
    /// extension.
    pub fn extension(&self) -> Option<&str> {
        let name = self.base_name();
        match name.rfind('.') {
            Some(idx) if idx > 0 && idx + 1 < name.len() => Some(&name[idx + 1..]),
            _ => None,
        }
    }

    /// Every prefix of this path, root first, the path itself last.
    pub fn lineage(&self) -> Vec<Self> {
        let mut chain = vec![Self::root()];
        if self.is_root() {
            return chain;
        }
        for (idx, ch) in self.0.char_indices().skip(1) {
            if ch == SEPARATOR {
                chain.push(Self(self.0[..idx].to_string()));
            }
        }
        chain.push(self.clone());
        chain
    }

    /// Whether `self` is `dir` or sits somewhere below it.
    pub fn starts_with(&self, dir: &Self) -> bool {
        if dir.is_root() {
            return true;
        }
        self.0 == dir.0
            || (self.0.starts_with(&dir.0) && self.0.as_bytes()[dir.0.len()] == SEPARATOR as u8)
    }

    /// Suffix of `self` below `dir`, without a leading separator.
    pub fn relative_to(&self, dir: &Self) -> Option<&str> {
        if !self.starts_with(dir) {
            return None;
        }
        if self.0 == dir.0 {
            return Some("");
        }
        let start = if dir.is_root() { 1 } else { dir.0.len() + 1 };
        Some(&self.0[start..])
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VirtualPath {
    fn from(raw: &str) -> Self {
        Self::canonicalize(raw)
    }
}

/// Append or increment the `" (n)"` marker immediately before the file
/// extension: `report.txt` becomes `report (1).txt`, `report (1).txt` becomes
/// `report (2).txt`, and extension-less names increment the same way.
pub fn upcount_name(path: &VirtualPath) -> VirtualPath {
    let name = path.base_name();
    let (stem, ext) = match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    };
    let next = match parse_counter(stem) {
        Some((bare, n)) => format!("{} ({}){}", bare, n + 1, ext),
        None => format!("{} (1){}", stem, ext),
    };
    path.parent().join(&next)
}

/// Probe `exists` and upcount until the candidate is free. Deterministic for
/// a fixed existing-name set.
pub fn collision_free_name<F>(candidate: VirtualPath, exists: F) -> VirtualPath
where
    F: Fn(&VirtualPath) -> bool,
{
    let mut current = candidate;
    while exists(&current) {
        current = upcount_name(&current);
    }
    current
}

fn parse_counter(stem: &str) -> Option<(&str, u64)> {
    let inner = stem.strip_suffix(')')?;
    let open = inner.rfind(" (")?;
    let digits = &inner[open + 2..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((&inner[..open], digits.parse().ok()?))
}

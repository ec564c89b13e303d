//! Deterministic in-memory backend double.
//!
//! Listing order is lexicographic by path (BTreeMap iteration), which puts
//! parent directories before their contents in recursive listings. The
//! double counts listing calls so tests can observe cache behavior, and can
//! optionally advertise native recursive copy/move to exercise the
//! orchestrator's fast path.

use std::collections::BTreeMap;
use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::path::VirtualPath;

use super::{NativeRecursiveOps, StorageBackend};

#[derive(Debug, Clone)]
enum Stored {
    File(Vec<u8>),
    Dir,
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<BTreeMap<String, Stored>>,
    native: bool,
    list_calls: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that advertises native recursive copy/move.
    pub fn with_native_recursive() -> Self {
        Self {
            native: true,
            ..Self::default()
        }
    }

    /// Number of `list_contents` calls served so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, BTreeMap<String, Stored>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Stored>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn not_found(op: &'static str, path: &VirtualPath) -> Error {
        Error::backend(
            op,
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such path"),
        )
    }

    fn insert_with_parents(state: &mut BTreeMap<String, Stored>, path: &VirtualPath, node: Stored) {
        for ancestor in path.lineage() {
            if ancestor.is_root() || ancestor == *path {
                continue;
            }
            state
                .entry(ancestor.as_str().to_string())
                .or_insert(Stored::Dir);
        }
        state.insert(path.as_str().to_string(), node);
    }

    fn subtree_keys(state: &BTreeMap<String, Stored>, dir: &VirtualPath) -> Vec<String> {
        let prefix = format!("{}{}", dir.as_str(), crate::path::SEPARATOR);
        state
            .keys()
            .filter(|key| key.as_str() == dir.as_str() || key.starts_with(&prefix))
            .cloned()
            .collect()
    }

    fn entry_for(path: &VirtualPath, stored: &Stored) -> Entry {
        match stored {
            Stored::File(bytes) => Entry::file(path.clone(), bytes.len() as u64, None),
            Stored::Dir => Entry::dir(path.clone()),
        }
    }

    fn transplant(
        state: &mut BTreeMap<String, Stored>,
        src: &VirtualPath,
        dst: &VirtualPath,
        remove_source: bool,
    ) {
        let keys = Self::subtree_keys(state, src);
        for key in keys {
            let relocated = if key == src.as_str() {
                dst.clone()
            } else {
                dst.join(&key[src.as_str().len() + 1..])
            };
            let node = if remove_source {
                state.remove(&key)
            } else {
                state.get(&key).cloned()
            };
            if let Some(node) = node {
                Self::insert_with_parents(state, &relocated, node);
            }
        }
    }
}

impl StorageBackend for MemoryBackend {
    fn list_contents(&self, path: &VirtualPath, recursive: bool) -> Result<Vec<Entry>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.read_state();
        let prefix = if path.is_root() {
            crate::path::SEPARATOR.to_string()
        } else {
            format!("{}{}", path.as_str(), crate::path::SEPARATOR)
        };
        let mut out = Vec::new();
        for (key, stored) in state.iter() {
            if key.as_str() == path.as_str() || !key.starts_with(&prefix) {
                continue;
            }
            let rest = &key[prefix.len()..];
            if !recursive && rest.contains(crate::path::SEPARATOR) {
                continue;
            }
            out.push(Self::entry_for(&VirtualPath::canonicalize(key), stored));
        }
        Ok(out)
    }

    fn has(&self, path: &VirtualPath) -> Result<bool> {
        Ok(self.read_state().contains_key(path.as_str()))
    }

    fn size_of(&self, path: &VirtualPath) -> Result<Option<u64>> {
        Ok(match self.read_state().get(path.as_str()) {
            Some(Stored::File(bytes)) => Some(bytes.len() as u64),
            _ => None,
        })
    }

    fn create_dir(&self, path: &VirtualPath) -> Result<()> {
        let mut state = self.write_state();
        Self::insert_with_parents(&mut state, path, Stored::Dir);
        Ok(())
    }

    fn put(&self, path: &VirtualPath, bytes: &[u8]) -> Result<()> {
        let mut state = self.write_state();
        Self::insert_with_parents(&mut state, path, Stored::File(bytes.to_vec()));
        Ok(())
    }

    fn put_stream(&self, path: &VirtualPath, reader: &mut dyn Read) -> Result<u64> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|err| Error::backend("put_stream", path, err))?;
        let written = bytes.len() as u64;
        let mut state = self.write_state();
        Self::insert_with_parents(&mut state, path, Stored::File(bytes));
        Ok(written)
    }

    fn copy(&self, src: &VirtualPath, dst: &VirtualPath) -> Result<()> {
        let mut state = self.write_state();
        let bytes = match state.get(src.as_str()) {
            Some(Stored::File(bytes)) => bytes.clone(),
            _ => return Err(Self::not_found("copy", src)),
        };
        Self::insert_with_parents(&mut state, dst, Stored::File(bytes));
        Ok(())
    }

    fn rename(&self, src: &VirtualPath, dst: &VirtualPath) -> Result<()> {
        let mut state = self.write_state();
        match state.get(src.as_str()) {
            Some(Stored::File(_)) => {
                let node = state
                    .remove(src.as_str())
                    .ok_or_else(|| Self::not_found("rename", src))?;
                Self::insert_with_parents(&mut state, dst, node);
                Ok(())
            }
            Some(Stored::Dir) => {
                Self::transplant(&mut state, src, dst, true);
                Ok(())
            }
            None => Err(Self::not_found("rename", src)),
        }
    }

    fn delete(&self, path: &VirtualPath) -> Result<()> {
        let mut state = self.write_state();
        match state.remove(path.as_str()) {
            Some(_) => Ok(()),
            None => Err(Self::not_found("delete", path)),
        }
    }

    fn delete_many(&self, paths: &[VirtualPath]) -> Result<()> {
        let mut state = self.write_state();
        for path in paths {
            state.remove(path.as_str());
        }
        Ok(())
    }

    fn delete_dir(&self, path: &VirtualPath) -> Result<()> {
        let mut state = self.write_state();
        for key in Self::subtree_keys(&state, path) {
            state.remove(&key);
        }
        Ok(())
    }

    fn read(&self, path: &VirtualPath) -> Result<Vec<u8>> {
        match self.read_state().get(path.as_str()) {
            Some(Stored::File(bytes)) => Ok(bytes.clone()),
            _ => Err(Self::not_found("read", path)),
        }
    }

    fn read_stream(&self, path: &VirtualPath) -> Result<(Box<dyn Read + Send>, u64)> {
        let bytes = self.read(path)?;
        let size = bytes.len() as u64;
        Ok((Box::new(std::io::Cursor::new(bytes)), size))
    }

    fn native_recursive(&self) -> Option<&dyn NativeRecursiveOps> {
        if self.native {
            Some(self)
        } else {
            None
        }
    }
}

impl NativeRecursiveOps for MemoryBackend {
    fn copy_dir(&self, src: &VirtualPath, dst: &VirtualPath) -> Result<()> {
        let mut state = self.write_state();
        if !matches!(state.get(src.as_str()), Some(Stored::Dir)) {
            return Err(Self::not_found("copy_dir", src));
        }
        Self::transplant(&mut state, src, dst, false);
        Ok(())
    }

    fn move_dir(&self, src: &VirtualPath, dst: &VirtualPath) -> Result<()> {
        let mut state = self.write_state();
        if !matches!(state.get(src.as_str()), Some(Stored::Dir)) {
            return Err(Self::not_found("move_dir", src));
        }
        Self::transplant(&mut state, src, dst, true);
        Ok(())
    }
}

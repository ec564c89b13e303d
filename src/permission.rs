//! Permission grants and the listing/capability filter.
//!
//! The grant store is an external capability (a relational table in the
//! source deployment); the crate only consumes `find`/`insert`. Listing
//! filtering intersects entries with grant paths by **exact** match;
//! `has_all` grants are not expanded into descendant paths there. Capability
//! checks (`grants_for`) are the one place a `has_all` grant applies to a
//! whole subtree: an exact grant wins, otherwise the nearest ancestor grant
//! flagged `has_all` supplies the access set.

use std::collections::{BTreeSet, HashSet};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::entry::EntryKind;
use crate::error::Result;
use crate::path::VirtualPath;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Read,
    Write,
    Create,
    Delete,
}

impl std::fmt::Display for Access {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Create => "create",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub disk: String,
    pub path: VirtualPath,
    pub access: BTreeSet<Access>,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub has_all: bool,
}

/// Exact-match query against the grant store, mirroring a `WHERE` clause.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GrantQuery {
    pub disk: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<VirtualPath>,
}

pub trait PermissionStore: Send + Sync {
    fn find(&self, query: &GrantQuery) -> Result<Vec<PermissionGrant>>;
    fn insert(&self, grant: PermissionGrant) -> Result<()>;
}

/// In-memory grant store double for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryPermissionStore {
    grants: RwLock<Vec<PermissionGrant>>,
}

impl MemoryPermissionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PermissionStore for MemoryPermissionStore {
    fn find(&self, query: &GrantQuery) -> Result<Vec<PermissionGrant>> {
        let grants = self
            .grants
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(grants
            .iter()
            .filter(|grant| grant.disk == query.disk)
            .filter(|grant| match &query.path {
                Some(path) => grant.path == *path,
                None => true,
            })
            .cloned()
            .collect())
    }

    fn insert(&self, grant: PermissionGrant) -> Result<()> {
        self.grants
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(grant);
        Ok(())
    }
}

/// Enforcement gate consulted once per operation by the orchestrator.
pub struct PermissionFilter {
    store: std::sync::Arc<dyn PermissionStore>,
    disk: String,
    enforced: bool,
}

impl std::fmt::Debug for PermissionFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionFilter")
            .field("disk", &self.disk)
            .field("enforced", &self.enforced)
            .finish_non_exhaustive()
    }
}

impl PermissionFilter {
    pub fn new(store: std::sync::Arc<dyn PermissionStore>, disk: String, enforced: bool) -> Self {
        Self {
            store,
            disk,
            enforced,
        }
    }

    pub fn is_enforced(&self) -> bool {
        self.enforced
    }

    /// Grant paths at or below `base`, for exact-match intersection with a
    /// listing.
    pub fn allowed_paths(&self, base: &VirtualPath) -> Result<HashSet<VirtualPath>> {
        let grants = self.store.find(&GrantQuery {
            disk: self.disk.clone(),
            path: None,
        })?;
        Ok(grants
            .into_iter()
            .filter(|grant| grant.path.starts_with(base))
            .map(|grant| grant.path)
            .collect())
    }

    /// Access set for `path`: exact grants first, then the nearest ancestor
    /// grant flagged `has_all`.
    pub fn grants_for(&self, path: &VirtualPath) -> Result<BTreeSet<Access>> {
        let grants = self.store.find(&GrantQuery {
            disk: self.disk.clone(),
            path: None,
        })?;

        let mut exact = BTreeSet::new();
        for grant in grants.iter().filter(|grant| grant.path == *path) {
            exact.extend(grant.access.iter().copied());
        }
        if !exact.is_empty() {
            return Ok(exact);
        }

        for ancestor in path.lineage().iter().rev().skip(1) {
            if let Some(grant) = grants
                .iter()
                .find(|grant| grant.has_all && grant.path == *ancestor)
            {
                return Ok(grant.access.clone());
            }
        }
        Ok(BTreeSet::new())
    }

    /// Typed allow/deny decision. Always allows when enforcement is off.
    pub fn allows(&self, access: Access, path: &VirtualPath) -> Result<bool> {
        if !self.enforced {
            return Ok(true);
        }
        Ok(self.grants_for(path)?.contains(&access))
    }
}

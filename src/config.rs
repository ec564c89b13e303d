use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::path::SEPARATOR;

const DISK_ID_MAX_LEN: usize = 64;
// Guardrail against misconfigured TTLs keeping stale listings alive for days.
const CACHE_TTL_HARD_CAP_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

const fn default_cache_ttl_secs() -> u64 {
    300
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManagerConfig {
    /// Identifier of the active backend. Namespaces cache keys so multiple
    /// backends never collide in a shared cache store.
    pub disk: String,
    #[serde(default)]
    pub cache: CacheConfig,
    /// When set, every capability must be backed by an explicit grant.
    #[serde(default)]
    pub deny_all: bool,
    #[serde(default = "default_separator")]
    pub separator: char,
}

fn default_separator() -> char {
    SEPARATOR
}

fn is_valid_disk_id(id: &str) -> bool {
    id.as_bytes().iter().all(|byte| {
        matches!(
            byte,
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'.' | b'_' | b'-'
        )
    })
}

impl ManagerConfig {
    pub fn new(disk: impl Into<String>) -> Self {
        Self {
            disk: disk.into(),
            cache: CacheConfig::default(),
            deny_all: false,
            separator: SEPARATOR,
        }
    }

    pub fn with_cache(mut self, ttl_secs: u64) -> Self {
        self.cache = CacheConfig {
            enabled: true,
            ttl_secs,
        };
        self
    }

    pub fn with_deny_all(mut self) -> Self {
        self.deny_all = true;
        self
    }

    /// Structural validation only; no backend or cache store is touched.
    pub fn validate(&self) -> Result<()> {
        if self.disk.is_empty() {
            return Err(Error::InvalidConfig("disk is empty".to_string()));
        }
        if self.disk.len() > DISK_ID_MAX_LEN {
            return Err(Error::InvalidConfig(format!(
                "disk id is too long: {:?} (max={})",
                self.disk, DISK_ID_MAX_LEN
            )));
        }
        if !is_valid_disk_id(&self.disk) {
            return Err(Error::InvalidConfig(format!(
                "disk id contains invalid characters: {:?} (allowed: [A-Za-z0-9._-])",
                self.disk
            )));
        }
        if self.separator != SEPARATOR {
            return Err(Error::InvalidConfig(format!(
                "unsupported separator {:?}; the virtual path space is normalized on {:?}",
                self.separator, SEPARATOR
            )));
        }
        if self.cache.enabled {
            if self.cache.ttl_secs == 0 {
                return Err(Error::InvalidConfig(
                    "cache.ttl_secs must be > 0".to_string(),
                ));
            }
            if self.cache.ttl_secs > CACHE_TTL_HARD_CAP_SECS {
                return Err(Error::InvalidConfig(format!(
                    "cache.ttl_secs must be <= {CACHE_TTL_HARD_CAP_SECS}"
                )));
            }
        }
        Ok(())
    }
}

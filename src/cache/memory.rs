//! In-memory TTL cache store double.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::error::Result;

use super::CacheStore;

struct Slot {
    bytes: Vec<u8>,
    expires_at: Instant,
}

#[derive(Default)]
pub struct MemoryCacheStore {
    slots: Mutex<HashMap<String, Slot>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drops the key when expired; expiry is indistinguishable from absence.
    fn live_slot<'a>(
        slots: &'a mut HashMap<String, Slot>,
        key: &str,
    ) -> Option<&'a Slot> {
        let expired = slots
            .get(key)
            .is_some_and(|slot| slot.expires_at <= Instant::now());
        if expired {
            slots.remove(key);
            return None;
        }
        slots.get(key)
    }
}

impl std::fmt::Debug for MemoryCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCacheStore")
            .field("keys", &self.lock().len())
            .finish()
    }
}

impl CacheStore for MemoryCacheStore {
    fn exists(&self, key: &str) -> Result<bool> {
        let mut slots = self.lock();
        Ok(Self::live_slot(&mut slots, key).is_some())
    }

    fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut slots = self.lock();
        Ok(Self::live_slot(&mut slots, key).map(|slot| slot.bytes.clone()))
    }

    fn store(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        self.lock().insert(
            key.to_string(),
            Slot {
                bytes: value.to_vec(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    fn forget(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}

//! In-process implementation of [`HashCounterBackend`].
//!
//! Mirrors the Redis semantics the distributed store relies on: per-call
//! atomicity, lazily evaluated key expiry, and `HINCRBY` creating a key
//! without expiry. Useful for a single process that wants the distributed
//! store's TTL-driven behavior, and for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::HashCounterBackend;
use crate::clock::{Clock, SystemClock};
use crate::errors::{StoreError, StoreResult};
use crate::resilience::window::duration_millis;

#[derive(Debug, Default)]
struct Entry {
    fields: HashMap<String, i64>,
    /// Unix milliseconds; `None` means the key never expires
    expires_at: Option<i64>,
}

/// Hash map backend with clock-driven key expiry
#[derive(Debug)]
pub struct LocalHashBackend {
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, Entry>>,
}

impl LocalHashBackend {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Whether a live (unexpired) key exists
    pub fn contains_key(&self, key: &str) -> StoreResult<bool> {
        let mut entries = self.lock()?;
        Ok(self.live_entry(&mut entries, key).is_some())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, HashMap<String, Entry>>> {
        self.entries
            .lock()
            .map_err(|_| StoreError::backend("local hash backend lock poisoned"))
    }

    /// Fetch a key, dropping it first if it has expired
    fn live_entry<'a>(
        &self,
        entries: &'a mut HashMap<String, Entry>,
        key: &str,
    ) -> Option<&'a mut Entry> {
        let now = self.clock.now_millis();
        let expired = entries
            .get(key)
            .and_then(|entry| entry.expires_at)
            .is_some_and(|expires_at| expires_at <= now);
        if expired {
            entries.remove(key);
        }
        entries.get_mut(key)
    }
}

impl Default for LocalHashBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HashCounterBackend for LocalHashBackend {
    async fn increment_and_expire(
        &self,
        key: &str,
        field: &str,
        delta: i64,
        clear_field: &str,
        ttl: Duration,
    ) -> StoreResult<()> {
        let mut entries = self.lock()?;
        let expires_at = self.clock.now_millis().saturating_add(duration_millis(ttl));
        if self.live_entry(&mut entries, key).is_none() {
            entries.insert(key.to_string(), Entry::default());
        }
        let entry = entries
            .get_mut(key)
            .ok_or_else(|| StoreError::backend("local hash entry vanished"))?;

        *entry.fields.entry(field.to_string()).or_insert(0) += delta;
        entry.fields.remove(clear_field);
        entry.expires_at = Some(expires_at);
        Ok(())
    }

    async fn increment(&self, key: &str, field: &str, delta: i64) -> StoreResult<i64> {
        let mut entries = self.lock()?;
        if self.live_entry(&mut entries, key).is_none() {
            entries.insert(key.to_string(), Entry::default());
        }
        let entry = entries
            .get_mut(key)
            .ok_or_else(|| StoreError::backend("local hash entry vanished"))?;

        let value = entry.fields.entry(field.to_string()).or_insert(0);
        *value += delta;
        Ok(*value)
    }

    async fn time_to_live(&self, key: &str) -> StoreResult<Option<Duration>> {
        let mut entries = self.lock()?;
        let now = self.clock.now_millis();
        let ttl = self
            .live_entry(&mut entries, key)
            .and_then(|entry| entry.expires_at)
            .and_then(|expires_at| u64::try_from(expires_at - now).ok())
            .map(Duration::from_millis);
        Ok(ttl)
    }

    async fn read_counter(&self, key: &str, field: &str) -> StoreResult<Option<i64>> {
        let mut entries = self.lock()?;
        Ok(self
            .live_entry(&mut entries, key)
            .and_then(|entry| entry.fields.get(field).copied()))
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

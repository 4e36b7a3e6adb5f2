//! Short-lived snapshot cache.
//!
//! Snapshots are keyed on the row limit alone and shared as
//! `Arc<Snapshot>`; nobody mutates a cached snapshot. Entries expire after
//! a fixed TTL, and a TTL of zero turns the cache off. Failed refreshes
//! are never stored.

use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::FetchError;
use crate::pipeline::{Pipeline, Snapshot};
use crate::settings::SourceSettings;

struct Entry {
    stored_at: Instant,
    snapshot: Arc<Snapshot>,
}

/// A [`Pipeline`] fronted by a TTL cache.
pub struct SnapshotCache {
    pipeline: Pipeline,
    ttl: Duration,
    entries: Mutex<BTreeMap<u32, Entry>>,
}

impl SnapshotCache {
    #[must_use]
    pub fn new(pipeline: Pipeline, ttl: Duration) -> Self {
        Self {
            pipeline,
            ttl,
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    /// Builds the production pipeline and cache from settings.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the HTTP client cannot be
    /// constructed.
    pub fn from_settings(settings: &SourceSettings) -> Result<Self, FetchError> {
        Ok(Self::new(
            Pipeline::from_settings(settings)?,
            settings.cache_ttl(),
        ))
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns a snapshot for `row_limit`, refreshing if there is no
    /// fresh cached one.
    ///
    /// # Errors
    ///
    /// Returns the refresh's [`FetchError`] on a cache miss that fails.
    pub async fn get(&self, row_limit: NonZeroU32) -> Result<Arc<Snapshot>, FetchError> {
        if let Some(snapshot) = self.lookup(row_limit.get(), Instant::now()) {
            log::debug!("Snapshot cache hit (numOfRows={row_limit})");
            return Ok(snapshot);
        }
        log::debug!("Snapshot cache miss (numOfRows={row_limit})");

        let snapshot = Arc::new(self.pipeline.refresh(row_limit).await?);
        self.store(row_limit.get(), Arc::clone(&snapshot), Instant::now());
        Ok(snapshot)
    }

    /// Drops every cached snapshot.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn lookup(&self, row_limit: u32, now: Instant) -> Option<Arc<Snapshot>> {
        if self.ttl.is_zero() {
            return None;
        }
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(&row_limit)?;
        if now.saturating_duration_since(entry.stored_at) < self.ttl {
            return Some(Arc::clone(&entry.snapshot));
        }
        entries.remove(&row_limit);
        None
    }

    /// Inserts a snapshot after evicting every expired entry, so keys that
    /// are never requested again do not pile up.
    fn store(&self, row_limit: u32, snapshot: Arc<Snapshot>, now: Instant) {
        if self.ttl.is_zero() {
            return;
        }
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| now.saturating_duration_since(entry.stored_at) < self.ttl);
        let evicted = before - entries.len();
        if evicted > 0 {
            log::debug!("Evicted {evicted} expired snapshot(s)");
        }
        entries.insert(
            row_limit,
            Entry {
                stored_at: now,
                snapshot,
            },
        );
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

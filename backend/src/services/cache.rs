//! In-memory forecast cache bounded by age and entry count.
//!
//! Entries expire a fixed time after insertion. When the cache is full,
//! expired entries are purged first and then the oldest insertions are
//! evicted until the new entry fits. Lookups do not refresh an entry.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::models::{ForecastBackend, ForecastResponse};

/// Cache key: repository plus the pipeline that produced the payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub repo: String,
    pub backend: ForecastBackend,
}

impl CacheKey {
    pub fn new(repo: impl Into<String>, backend: ForecastBackend) -> Self {
        Self {
            repo: repo.into(),
            backend,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    inserted_at: Instant,
    value: Arc<ForecastResponse>,
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<CacheKey, CacheEntry>,
    /// Insertion order, oldest first. May hold keys that were since replaced
    /// or dropped; those are skipped on eviction.
    order: VecDeque<(CacheKey, Instant)>,
}

/// Shared TTL + capacity bounded cache of assembled forecast responses.
#[derive(Debug)]
pub struct ForecastCache {
    ttl: Duration,
    capacity: usize,
    inner: Mutex<CacheInner>,
}

impl ForecastCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity,
            inner: Mutex::new(CacheInner::default()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Look up a live entry. Expired entries are dropped on the way.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<ForecastResponse>> {
        let mut inner = self.inner.lock();
        let now = Instant::now();
        let found = inner.entries.get(key).map(|entry| {
            (
                now.duration_since(entry.inserted_at) < self.ttl,
                Arc::clone(&entry.value),
            )
        });
        match found {
            Some((true, value)) => Some(value),
            Some((false, _)) => {
                inner.entries.remove(key);
                debug!("Cache entry for {} ({}) expired", key.repo, key.backend);
                None
            }
            None => None,
        }
    }

    /// Insert or replace an entry, evicting as needed.
    pub fn insert(&self, key: CacheKey, value: Arc<ForecastResponse>) {
        if self.capacity == 0 {
            return;
        }

        let mut inner = self.inner.lock();
        let now = Instant::now();
        if !inner.entries.contains_key(&key) && inner.entries.len() >= self.capacity {
            self.purge_expired(&mut inner, now);
            while inner.entries.len() >= self.capacity {
                match inner.order.pop_front() {
                    Some((oldest, stamp)) => {
                        let current = inner.entries.get(&oldest).map(|e| e.inserted_at);
                        if current == Some(stamp) {
                            inner.entries.remove(&oldest);
                            debug!("Evicted cache entry for {} ({})", oldest.repo, oldest.backend);
                        }
                    }
                    None => break,
                }
            }
        }

        inner.order.push_back((key.clone(), now));
        inner.entries.insert(
            key,
            CacheEntry {
                inserted_at: now,
                value,
            },
        );

        // Keep the order queue from growing without bound under replacements
        if inner.order.len() > self.capacity.saturating_mul(2) {
            let CacheInner { entries, order } = &mut *inner;
            order.retain(|(k, stamp)| entries.get(k).map(|e| e.inserted_at) == Some(*stamp));
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order.clear();
    }

    fn purge_expired(&self, inner: &mut CacheInner, now: Instant) {
        let ttl = self.ttl;
        let before = inner.entries.len();
        inner
            .entries
            .retain(|_, entry| now.duration_since(entry.inserted_at) < ttl);
        let CacheInner { entries, order } = &mut *inner;
        order.retain(|(k, stamp)| entries.get(k).map(|e| e.inserted_at) == Some(*stamp));
        let purged = before - entries.len();
        if purged > 0 {
            debug!("Purged {} expired cache entries", purged);
        }
    }
}

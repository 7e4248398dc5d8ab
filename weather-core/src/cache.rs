//! In-memory, time-bounded cache of weather summaries keyed by city.

use std::{
    collections::HashMap,
    future::Future,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};
use tokio::{sync::RwLock, time::Instant};
use tracing::debug;

use crate::{WeatherError, WeatherSummary};

type Gates = Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>;

/// Cache key for a city name.
///
/// Only case is folded: " London" and "London" are distinct keys.
pub fn cache_key(city: &str) -> String {
    city.to_lowercase()
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: WeatherSummary,
    stored_at: Instant,
}

#[derive(Debug)]
pub struct WeatherCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
    // One gate per key with a compute in progress.
    inflight: Gates,
}

/// Removes the in-flight gate for a key once its last holder is gone.
///
/// Runs on drop, so lookups abandoned mid-compute clean up as well.
struct GateRelease<'a> {
    inflight: &'a Gates,
    key: &'a str,
}

impl Drop for GateRelease<'_> {
    fn drop(&mut self) {
        let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        // Every holder drops its clone before its release runs, so a count of
        // one means the map holds the only reference.
        if inflight
            .get(self.key)
            .is_some_and(|gate| Arc::strong_count(gate) == 1)
        {
            inflight.remove(self.key);
        }
    }
}

impl WeatherCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the stored summary for `key` if it has not expired.
    pub async fn get(&self, key: &str) -> Option<WeatherSummary> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone())
    }

    /// Stores `value` under `key`, evicting every expired entry first.
    pub async fn insert(&self, key: impl Into<String>, value: WeatherSummary) {
        let mut entries = self.entries.write().await;

        let before = entries.len();
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!("Evicted {evicted} expired cache entries");
        }

        entries.insert(
            key.into(),
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Cache-aside lookup.
    ///
    /// On a miss `compute` runs and a successful result is stored; errors are
    /// returned without being cached. Concurrent misses on the same key wait
    /// for the first caller's compute instead of issuing their own.
    pub async fn lookup_or_compute<F, Fut>(
        &self,
        key: &str,
        compute: F,
    ) -> Result<WeatherSummary, WeatherError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<WeatherSummary, WeatherError>>,
    {
        if let Some(hit) = self.get(key).await {
            debug!("Cache hit for key '{key}'");
            return Ok(hit);
        }

        // Declared before the gate so it drops after it.
        let _release = GateRelease {
            inflight: &self.inflight,
            key,
        };
        let gate = {
            let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(inflight.entry(key.to_string()).or_default())
        };
        let _permit = gate.lock().await;

        if let Some(hit) = self.get(key).await {
            debug!("Cache filled by concurrent lookup for key '{key}'");
            return Ok(hit);
        }

        debug!("Cache miss for key '{key}'");
        let computed = compute().await;
        if let Ok(value) = &computed {
            self.insert(key, value.clone()).await;
        }
        computed
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

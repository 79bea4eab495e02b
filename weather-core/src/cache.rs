use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::{collections::HashMap, future::Future, sync::Arc};

use crate::{clock::Clock, model::WeatherSnapshot, provider::WeatherError};

/// Default freshness window for a cached observation.
pub const DEFAULT_TTL_SECS: i64 = 600;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: WeatherSnapshot,
    expires_at: DateTime<Utc>,
}

/// In-process, time-bounded memo of provider results keyed by city.
///
/// Keys are used verbatim, so `Moscow` and `moscow` are separate entries.
/// Expiry is checked on read; there is no background sweep. Concurrent misses
/// for the same key are not coalesced and the last successful insert wins.
#[derive(Debug)]
pub struct FreshnessCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl FreshnessCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { ttl, clock, entries: RwLock::new(HashMap::new()) }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the unexpired value for `city`, if any.
    pub fn peek(&self, city: &str) -> Option<WeatherSnapshot> {
        let now = self.clock.now();
        self.entries
            .read()
            .get(city)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value.clone())
    }

    /// Serve `city` from the cache, or run `fetch` once and keep a successful result.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        city: &str,
        fetch: F,
    ) -> Result<WeatherSnapshot, WeatherError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<WeatherSnapshot, WeatherError>>,
    {
        if let Some(hit) = self.peek(city) {
            tracing::debug!(city, "weather cache hit");
            return Ok(hit);
        }

        tracing::debug!(city, "weather cache miss");
        self.evict_expired(city);

        let snapshot = fetch().await?;

        match self.clock.now().checked_add_signed(self.ttl) {
            Some(expires_at) => {
                self.entries
                    .write()
                    .insert(city.to_string(), CacheEntry { value: snapshot.clone(), expires_at });
            }
            None => tracing::warn!(city, "cache expiry out of range, not caching"),
        }

        Ok(snapshot)
    }

    fn evict_expired(&self, city: &str) {
        let now = self.clock.now();
        let mut entries = self.entries.write();
        if entries.get(city).is_some_and(|entry| entry.expires_at <= now) {
            entries.remove(city);
        }
    }
}

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};

use crate::{
    core::region::Region,
    prelude::*,
    quantity::price::{KilowattHourPrice, OrePerKilowattHour},
};

/// Hit and miss counters shared by the memoizing caches.
#[derive(Copy, Clone, Debug, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub last_cleared_at: Option<DateTime<Utc>>,
}

impl CacheStats {
    pub const fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub const fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub const fn total(&self) -> u64 {
        self.hits + self.misses
    }

    /// Share of lookups served from the cache, `0.0` when there were none.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        if self.total() == 0 { 0.0 } else { self.hits as f64 / self.total() as f64 }
    }

    pub fn log(&self, name: &str, now: DateTime<Utc>) {
        let since_cleared = self.last_cleared_at.map_or_else(
            || "never".to_string(),
            |cleared_at| format!("{}s", (now - cleared_at).num_seconds()),
        );
        info!(
            cache = name,
            hit_rate = %format!("{:.2}%", self.hit_rate() * 100.0),
            hits = self.hits,
            misses = self.misses,
            total = self.total(),
            %since_cleared,
            "cache stats",
        );
    }
}

/// Values derived from a single raw record.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Derived {
    pub start: DateTime<FixedOffset>,
    pub price: KilowattHourPrice,
    pub display_price: OrePerKilowattHour,
}

/// Memoized derivations keyed by the upstream `time_start`.
///
/// Lives for one region at a time and expires after its TTL
/// since it was last populated.
pub struct NormalizationCache {
    entries: HashMap<String, Derived>,
    region: Option<Region>,
    populated_at: Option<DateTime<Utc>>,
    ttl: TimeDelta,
    stats: CacheStats,
}

impl Default for NormalizationCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}

impl NormalizationCache {
    pub const DEFAULT_TTL: TimeDelta = TimeDelta::hours(1);

    #[must_use]
    pub fn new(ttl: TimeDelta) -> Self {
        Self {
            entries: HashMap::new(),
            region: None,
            populated_at: None,
            ttl,
            stats: CacheStats::default(),
        }
    }

    #[must_use]
    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop everything when the region changed or the entries expired.
    ///
    /// Returns `true` if the cache got invalidated.
    pub fn invalidate_if_stale(&mut self, region: Region, now: DateTime<Utc>) -> bool {
        let region_changed = self.region != Some(region);
        let expired = self.populated_at.is_none_or(|populated_at| now - populated_at > self.ttl);
        if !region_changed && !expired {
            return false;
        }
        info!(
            region_changed,
            expired,
            populated = self.populated_at.is_some(),
            "invalidating the normalization cache…",
        );
        self.invalidate(now);
        self.region = Some(region);
        true
    }

    pub fn invalidate(&mut self, now: DateTime<Utc>) {
        self.entries.clear();
        self.populated_at = None;
        self.stats.last_cleared_at = Some(now);
    }

    /// Drop the entries whose keys are not in the batch.
    pub fn retain_keys(&mut self, keys: &HashSet<&str>) {
        let n_entries = self.entries.len();
        self.entries.retain(|key, _| keys.contains(key.as_str()));
        if self.entries.len() != n_entries {
            debug!(n_evicted = n_entries - self.entries.len(), "evicted outdated entries");
        }
    }

    pub fn mark_populated(&mut self, now: DateTime<Utc>) {
        self.populated_at = Some(now);
    }

    /// Look the key up, deriving and storing the value on a miss.
    ///
    /// Failed derivations are not stored.
    pub fn get_or_try_insert_with(
        &mut self,
        key: &str,
        derive: impl FnOnce() -> Result<Derived>,
    ) -> Result<Derived> {
        if let Some(derived) = self.entries.get(key) {
            self.stats.record_hit();
            return Ok(*derived);
        }
        self.stats.record_miss();
        let derived = derive()?;
        self.entries.insert(key.to_string(), derived);
        Ok(derived)
    }
}

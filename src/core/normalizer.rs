use std::collections::HashSet;

use chrono::{DateTime, Timelike, Utc};

use crate::{
    core::{
        cache::{CacheStats, Derived, NormalizationCache},
        record::{NormalizedPriceRecord, RawPriceRecord},
        region::Region,
    },
    prelude::*,
    quantity::price::KilowattHourPrice,
};

/// Turns raw upstream records into [`NormalizedPriceRecord`]s, memoizing the derivations.
#[derive(Default)]
pub struct Normalizer {
    cache: NormalizationCache,
}

impl Normalizer {
    #[must_use]
    pub const fn stats(&self) -> &CacheStats {
        self.cache.stats()
    }

    /// See [`NormalizationCache::invalidate_if_stale`].
    pub fn invalidate_if_stale(&mut self, region: Region, now: DateTime<Utc>) -> bool {
        self.cache.invalidate_if_stale(region, now)
    }

    pub fn invalidate(&mut self, now: DateTime<Utc>) {
        self.cache.invalidate(now);
    }

    #[must_use]
    pub fn n_cached(&self) -> usize {
        self.cache.len()
    }

    /// Normalize the records, preserving their order.
    ///
    /// Malformed input yields an empty vector: the whole batch is rejected
    /// if any single record is invalid. The caller is responsible for calling
    /// [`Normalizer::invalidate_if_stale`] beforehand.
    #[instrument(skip_all, fields(n_records = records.len()))]
    pub fn normalize(
        &mut self,
        records: &[RawPriceRecord],
        now: DateTime<Utc>,
    ) -> Vec<NormalizedPriceRecord> {
        match self.try_normalize(records, now) {
            Ok(normalized) => normalized,
            Err(error) => {
                warn!("rejected the price data: {error:#}");
                Vec::new()
            }
        }
    }

    fn try_normalize(
        &mut self,
        records: &[RawPriceRecord],
        now: DateTime<Utc>,
    ) -> Result<Vec<NormalizedPriceRecord>> {
        let validated = validate(records)?;
        let normalized = validated
            .iter()
            .map(|&(time_start, price)| {
                let derived = self.cache.get_or_try_insert_with(time_start, || {
                    let start = DateTime::parse_from_rfc3339(time_start)
                        .with_context(|| format!("invalid `time_start`: `{time_start}`"))?;
                    Ok(Derived { start, price, display_price: price.to_ore() })
                })?;
                Ok(NormalizedPriceRecord {
                    time_start: time_start.to_string(),
                    start: derived.start,
                    timestamp: derived.start.timestamp_millis(),
                    price: derived.price,
                    display_price: derived.display_price,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let keys = validated.iter().map(|(time_start, _)| *time_start).collect::<HashSet<_>>();
        self.cache.retain_keys(&keys);
        self.cache.mark_populated(now);
        debug!(n_normalized = normalized.len(), n_cached = self.cache.len(), "normalized");
        Ok(normalized)
    }
}

fn validate(records: &[RawPriceRecord]) -> Result<Vec<(&str, KilowattHourPrice)>> {
    ensure!(!records.is_empty(), "no price records");
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let time_start = record
                .time_start
                .as_deref()
                .filter(|time_start| !time_start.is_empty())
                .with_context(|| format!("record #{index} has no `time_start`"))?;
            let price = record
                .sek_per_kwh
                .filter(|price| !price.is_nan())
                .with_context(|| format!("record #{index} has no numeric price"))?;
            Ok((time_start, KilowattHourPrice(price)))
        })
        .collect()
}

/// Keep only the records starting on a whole hour.
///
/// Falls back to all the records when none of them does.
pub fn retain_whole_hours(records: Vec<RawPriceRecord>) -> Vec<RawPriceRecord> {
    let n_records = records.len();
    let (hourly, other): (Vec<_>, Vec<_>) = records.into_iter().partition(|record| {
        record
            .time_start
            .as_deref()
            .and_then(|time_start| DateTime::parse_from_rfc3339(time_start).ok())
            .is_some_and(|start| start.minute() == 0 && start.second() == 0)
    });
    if hourly.is_empty() {
        warn!(n_records, "no hourly prices found, keeping all the records");
        [hourly, other].concat()
    } else {
        if !other.is_empty() {
            info!(n_records, n_hourly = hourly.len(), "filtered down to hourly prices");
        }
        hourly
    }
}

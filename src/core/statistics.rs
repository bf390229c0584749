use std::collections::HashMap;

use chrono::{DateTime, Utc};
use itertools::{Itertools, MinMaxResult};

use crate::{
    core::{cache::CacheStats, record::NormalizedPriceRecord},
    quantity::price::OrePerKilowattHour,
};

/// Summary of a price window.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Statistics {
    pub lowest: OrePerKilowattHour,
    pub highest: OrePerKilowattHour,
    pub average: OrePerKilowattHour,
}

impl Statistics {
    pub const EMPTY: Self = Self {
        lowest: OrePerKilowattHour::ZERO,
        highest: OrePerKilowattHour::ZERO,
        average: OrePerKilowattHour::ZERO,
    };

    /// Aggregate the display prices, [`Self::EMPTY`] for an empty window.
    ///
    /// Meant to be called on the chart window, so that the statistics cover
    /// everything that is visible.
    pub fn aggregate(window: &[NormalizedPriceRecord]) -> Self {
        let (lowest, highest) =
            match window.iter().map(|record| record.display_price).minmax() {
                MinMaxResult::NoElements => return Self::EMPTY,
                MinMaxResult::OneElement(price) => (price, price),
                MinMaxResult::MinMax(lowest, highest) => (lowest, highest),
            };
        #[expect(clippy::cast_precision_loss)]
        let average = window.iter().map(|record| record.display_price).sum::<OrePerKilowattHour>()
            / window.len() as f64;
        Self { lowest, highest, average }
    }

    /// Average with exactly two decimals.
    #[must_use]
    pub fn formatted_average(&self) -> String {
        format!("{:.2}", self.average.0)
    }
}

/// Tertile of a price within the observed range.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PriceCategory {
    Low,
    Medium,
    High,
}

impl PriceCategory {
    const LOW_THRESHOLD: f64 = 0.33;
    const MEDIUM_THRESHOLD: f64 = 0.66;

    /// Classify the price, ties resolve to the lower category.
    pub fn classify(
        price: OrePerKilowattHour,
        lowest: OrePerKilowattHour,
        highest: OrePerKilowattHour,
    ) -> Self {
        let range = highest - lowest;
        if price <= lowest + range * Self::LOW_THRESHOLD {
            Self::Low
        } else if price <= lowest + range * Self::MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::High
        }
    }
}

/// Memoized [`PriceCategory::classify`].
///
/// Holds the entries of a single `(lowest, highest)` range at a time.
#[derive(Default)]
pub struct CategoryMemo {
    categories: HashMap<(OrePerKilowattHour, OrePerKilowattHour, OrePerKilowattHour), PriceCategory>,
    range: Option<(OrePerKilowattHour, OrePerKilowattHour)>,
    stats: CacheStats,
}

impl CategoryMemo {
    pub fn classify(
        &mut self,
        price: OrePerKilowattHour,
        lowest: OrePerKilowattHour,
        highest: OrePerKilowattHour,
    ) -> PriceCategory {
        if self.range != Some((lowest, highest)) {
            self.categories.clear();
            self.range = Some((lowest, highest));
        }
        if let Some(category) = self.categories.get(&(price, lowest, highest)) {
            self.stats.record_hit();
            return *category;
        }
        self.stats.record_miss();
        let category = PriceCategory::classify(price, lowest, highest);
        self.categories.insert((price, lowest, highest), category);
        category
    }

    /// Classify every record of the window against the statistics.
    pub fn classify_window(
        &mut self,
        window: &[NormalizedPriceRecord],
        statistics: &Statistics,
    ) -> Vec<PriceCategory> {
        window
            .iter()
            .map(|record| self.classify(record.display_price, statistics.lowest, statistics.highest))
            .collect()
    }

    pub fn invalidate(&mut self, now: DateTime<Utc>) {
        self.categories.clear();
        self.range = None;
        self.stats.last_cleared_at = Some(now);
    }

    #[must_use]
    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }

    #[must_use]
    pub fn n_entries(&self) -> usize {
        self.categories.len()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::{DateTime, TimeDelta};

    use super::*;
    use crate::{prelude::*, quantity::price::KilowattHourPrice};

    fn window(prices: &[f64]) -> Result<Vec<NormalizedPriceRecord>> {
        let midnight = DateTime::parse_from_rfc3339("2025-10-18T00:00:00+02:00")?;
        Ok(prices
            .iter()
            .zip(0..)
            .map(|(price, hour)| {
                let start = midnight + TimeDelta::hours(hour);
                NormalizedPriceRecord {
                    time_start: start.to_rfc3339(),
                    start,
                    timestamp: start.timestamp_millis(),
                    price: KilowattHourPrice(price / 100.0),
                    display_price: OrePerKilowattHour(*price),
                }
            })
            .collect())
    }

    #[test]
    fn test_aggregate_empty() {
        let statistics = Statistics::aggregate(&[]);
        assert_eq!(statistics, Statistics::EMPTY);
        assert_eq!(statistics.formatted_average(), "0.00");
    }

    #[test]
    fn test_aggregate_ok() -> Result {
        let statistics = Statistics::aggregate(&window(&[30.0, 10.0, 20.5, 45.25])?);
        assert_eq!(statistics.lowest, OrePerKilowattHour(10.0));
        assert_eq!(statistics.highest, OrePerKilowattHour(45.25));
        assert_abs_diff_eq!(statistics.average.0, 26.4375);
        assert_eq!(statistics.formatted_average(), "26.44");
        Ok(())
    }

    #[test]
    fn test_aggregate_single() -> Result {
        let statistics = Statistics::aggregate(&window(&[12.0])?);
        assert_eq!(statistics.lowest, statistics.highest);
        assert_eq!(statistics.formatted_average(), "12.00");
        Ok(())
    }

    #[test]
    fn test_category_boundaries() {
        let classify = |price| {
            PriceCategory::classify(
                OrePerKilowattHour(price),
                OrePerKilowattHour(0.0),
                OrePerKilowattHour(100.0),
            )
        };
        assert_eq!(classify(0.0), PriceCategory::Low);
        assert_eq!(classify(33.0), PriceCategory::Low);
        assert_eq!(classify(34.0), PriceCategory::Medium);
        assert_eq!(classify(66.0), PriceCategory::Medium);
        assert_eq!(classify(67.0), PriceCategory::High);
        assert_eq!(classify(100.0), PriceCategory::High);
    }

    #[test]
    fn test_flat_range_is_low() {
        let price = OrePerKilowattHour(42.0);
        assert_eq!(PriceCategory::classify(price, price, price), PriceCategory::Low);
    }

    #[test]
    fn test_memo() -> Result {
        let window = window(&[0.0, 50.0, 100.0, 50.0])?;
        let statistics = Statistics::aggregate(&window);
        let mut memo = CategoryMemo::default();
        let categories = memo.classify_window(&window, &statistics);
        assert_eq!(
            categories,
            [PriceCategory::Low, PriceCategory::Medium, PriceCategory::High, PriceCategory::Medium],
        );
        assert_eq!(memo.stats().misses, 3);
        assert_eq!(memo.stats().hits, 1);
        Ok(())
    }

    #[test]
    fn test_memo_range_change() {
        let mut memo = CategoryMemo::default();
        let ore = OrePerKilowattHour;
        assert_eq!(memo.classify(ore(50.0), ore(0.0), ore(100.0)), PriceCategory::Medium);
        assert_eq!(memo.classify(ore(10.0), ore(0.0), ore(100.0)), PriceCategory::Low);
        assert_eq!(memo.n_entries(), 2);
        assert_eq!(memo.classify(ore(50.0), ore(40.0), ore(100.0)), PriceCategory::Low);
        assert_eq!(memo.n_entries(), 1);
        assert_eq!(memo.stats().misses, 3);
    }
}

use chrono::{DateTime, FixedOffset, Utc};
use derive_more::Display;
use tokio::join;

use crate::{
    api::PriceSource,
    core::{
        integrity,
        normalizer::{Normalizer, retain_whole_hours},
        record::RawPriceRecord,
        region::Region,
        statistics::{CategoryMemo, PriceCategory, Statistics},
        window::{Selection, WindowSelector},
    },
    prelude::*,
};

/// Why there is nothing to show.
#[derive(Copy, Clone, Debug, Display, Eq, PartialEq)]
pub enum EmptyReason {
    #[display("the price data is malformed")]
    InvalidData,

    #[display("the price cache was inconsistent and got cleared")]
    CacheIntegrity,

    #[display("no price data is available")]
    NoData,
}

#[must_use]
#[derive(Clone, Debug)]
pub struct Report {
    pub region: Region,
    pub selection: Selection,

    /// Computed over the chart window.
    pub statistics: Statistics,

    /// Category of each box window record.
    pub box_categories: Vec<PriceCategory>,

    /// Category of each chart window record.
    pub chart_categories: Vec<PriceCategory>,
}

#[must_use]
#[derive(Clone, Debug)]
pub enum Outcome {
    Report(Box<Report>),
    Empty(EmptyReason),
}

impl Outcome {
    pub fn statistics(&self) -> Statistics {
        match self {
            Self::Report(report) => report.statistics,
            Self::Empty(_) => Statistics::EMPTY,
        }
    }
}

/// Long-lived state of the refresh cycles.
///
/// Cycles must not overlap: the caches are mutated without any locking.
#[derive(Default)]
pub struct Dashboard {
    normalizer: Normalizer,
    categories: CategoryMemo,
    selector: WindowSelector,
}

impl Dashboard {
    pub fn new(selector: WindowSelector) -> Self {
        Self { selector, ..Self::default() }
    }

    /// Fetch the prices and run a full cycle.
    ///
    /// Fails only when today's prices cannot be fetched.
    #[instrument(skip_all, fields(region = %region))]
    pub async fn refresh(
        &mut self,
        source: &impl PriceSource,
        region: Region,
        now: DateTime<FixedOffset>,
    ) -> Result<Outcome> {
        let records = fetch(source, region, now).await?;
        Ok(self.process(region, records, now))
    }

    /// Run the cycle over the already fetched records.
    pub fn process(
        &mut self,
        region: Region,
        records: Vec<RawPriceRecord>,
        now: DateTime<FixedOffset>,
    ) -> Outcome {
        let utc_now = now.with_timezone(&Utc);
        if self.normalizer.invalidate_if_stale(region, utc_now) {
            self.categories.invalidate(utc_now);
        }

        let records = retain_whole_hours(records);
        let normalized = self.normalizer.normalize(&records, utc_now);
        if normalized.is_empty() {
            return Outcome::Empty(EmptyReason::InvalidData);
        }

        let selection = self.selector.select(&normalized, &now);
        if let Err(error) = integrity::verify(&selection.box_window)
            .and_then(|()| integrity::verify(&selection.chart_window))
        {
            error!("cache integrity check failed: {error:#}");
            self.normalizer.invalidate(utc_now);
            self.categories.invalidate(utc_now);
            return Outcome::Empty(EmptyReason::CacheIntegrity);
        }
        if selection.is_empty() {
            return Outcome::Empty(EmptyReason::NoData);
        }

        let statistics = Statistics::aggregate(&selection.chart_window);
        let box_categories = self.categories.classify_window(&selection.box_window, &statistics);
        let chart_categories =
            self.categories.classify_window(&selection.chart_window, &statistics);
        self.normalizer.stats().log("normalization", utc_now);
        self.categories.stats().log("categories", utc_now);
        debug!(
            n_normalized = self.normalizer.n_cached(),
            n_categories = self.categories.n_entries(),
            "cache sizes",
        );

        Outcome::Report(Box::new(Report {
            region,
            selection,
            statistics,
            box_categories,
            chart_categories,
        }))
    }
}

/// Fetch today's and tomorrow's prices concurrently.
async fn fetch(
    source: &impl PriceSource,
    region: Region,
    now: DateTime<FixedOffset>,
) -> Result<Vec<RawPriceRecord>> {
    let today = now.date_naive();
    let tomorrow = today.succ_opt().context("there is no tomorrow")?;
    let (today_records, tomorrow_records) =
        join!(source.get_prices(region, today), source.get_prices(region, tomorrow));
    let mut records = today_records.context("failed to fetch today's prices")?;
    match tomorrow_records {
        Ok(tomorrow_records) => records.extend(tomorrow_records),
        Err(error) => warn!("tomorrow's prices are unavailable: {error:#}"),
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use approx::assert_abs_diff_eq;
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeDelta, TimeZone};
    use reqwest::Url;

    use super::*;
    use crate::{api::FetchError, core::window::Anchor};

    /// Serves the prepared days, any other day fails.
    struct Days(HashMap<NaiveDate, Vec<RawPriceRecord>>);

    #[async_trait]
    impl PriceSource for Days {
        async fn get_prices(
            &self,
            _region: Region,
            on: NaiveDate,
        ) -> Result<Vec<RawPriceRecord>, FetchError> {
            self.0.get(&on).cloned().ok_or_else(|| FetchError::Network {
                url: Url::parse(&format!("https://example.com/{on}.json")).unwrap(),
            })
        }
    }

    fn tz() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    /// 24 hourly records priced by the hour.
    fn raw_day(day: u32, price: impl Fn(u32) -> f64) -> Vec<RawPriceRecord> {
        (0..24)
            .map(|hour| {
                let start = tz().with_ymd_and_hms(2025, 1, day, hour, 0, 0).unwrap();
                RawPriceRecord::new(start.to_rfc3339(), price(hour))
            })
            .collect()
    }

    /// 10, 20, …, 240 öre.
    fn ascending(hour: u32) -> f64 {
        0.1 * f64::from(hour + 1)
    }

    fn at(day: u32, hour: u32) -> DateTime<FixedOffset> {
        tz().with_ymd_and_hms(2025, 1, day, hour, 0, 0).unwrap()
    }

    fn unwrap_report(outcome: Outcome) -> Report {
        match outcome {
            Outcome::Report(report) => *report,
            Outcome::Empty(reason) => panic!("unexpected empty outcome: {reason}"),
        }
    }

    #[test]
    fn test_end_to_end_exact_match() {
        let report =
            unwrap_report(Dashboard::default().process(Region::Se3, raw_day(10, ascending), at(10, 8)));
        assert_eq!(report.selection.anchor, Anchor::CurrentHour);
        assert_eq!(report.selection.box_window.len(), 8);
        assert_eq!(report.selection.chart_window.len(), 16);
        assert_eq!(report.selection.box_window[0].start, at(10, 8));
        assert_eq!(report.selection.chart_window[15].start, at(10, 23));

        // Prices of hours 8..24 are 90, 100, …, 240 öre:
        let expected_average = (9..=24).map(|n| f64::from(n) * 10.0).sum::<f64>() / 16.0;
        assert_abs_diff_eq!(report.statistics.average.0, expected_average, epsilon = 1e-9);
        assert_abs_diff_eq!(report.statistics.lowest.0, 90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(report.statistics.highest.0, 240.0, epsilon = 1e-9);
        assert_eq!(report.chart_categories.len(), 16);
        assert_eq!(report.chart_categories[0], PriceCategory::Low);
        assert_eq!(report.chart_categories[15], PriceCategory::High);
        assert_eq!(report.box_categories, report.chart_categories[..8]);
    }

    #[test]
    fn test_invalid_data() {
        let mut records = raw_day(10, ascending);
        records[3].sek_per_kwh = None;
        let outcome = Dashboard::default().process(Region::Se3, records, at(10, 8));
        assert!(matches!(outcome, Outcome::Empty(EmptyReason::InvalidData)));
        assert_eq!(outcome.statistics(), Statistics::EMPTY);
    }

    #[test]
    fn test_empty_input() {
        let outcome = Dashboard::default().process(Region::Se3, Vec::new(), at(10, 8));
        assert!(matches!(outcome, Outcome::Empty(EmptyReason::InvalidData)));
    }

    #[test]
    fn test_no_data() {
        let records = vec![RawPriceRecord::new("2025-01-10T08:15:00+01:00", 0.5)];
        let outcome = Dashboard::default().process(Region::Se3, records, at(10, 8));
        assert!(matches!(outcome, Outcome::Empty(EmptyReason::NoData)));
    }

    #[test]
    fn test_stale_data_falls_back_to_the_past() {
        let report =
            unwrap_report(Dashboard::default().process(Region::Se3, raw_day(10, ascending), at(12, 8)));
        assert_eq!(report.selection.anchor, Anchor::MostRecentPast);
        assert_eq!(report.selection.box_window.last().map(|record| record.start), Some(at(10, 23)));
    }

    #[test]
    fn test_memoization_across_cycles() {
        let mut dashboard = Dashboard::default();
        let now = at(10, 8);
        let _ = dashboard.process(Region::Se3, raw_day(10, ascending), now);
        let _ = dashboard.process(Region::Se3, raw_day(10, ascending), now + TimeDelta::minutes(10));
        assert_eq!(dashboard.normalizer.stats().misses, 24);
        assert_eq!(dashboard.normalizer.stats().hits, 24);
    }

    #[test]
    fn test_caches_stay_bounded_in_watch_mode() {
        let mut dashboard = Dashboard::default();
        for day in 10..=13 {
            let records = [raw_day(day, ascending), raw_day(day + 1, ascending)].concat();
            for step in 0..(24 * 6) {
                let now = at(day, 0) + TimeDelta::minutes(10 * step);
                let _ = unwrap_report(dashboard.process(Region::Se3, records.clone(), now));
            }
        }
        assert_eq!(dashboard.normalizer.n_cached(), 48);
        assert!(dashboard.categories.n_entries() <= 16);
    }

    #[test]
    fn test_integrity_failure_clears_the_caches() {
        let mut dashboard = Dashboard::default();
        let early = raw_day(10, ascending).into_iter().take(9).collect();
        let _ = unwrap_report(dashboard.process(Region::Se3, early, at(10, 8)));
        assert!(dashboard.categories.n_entries() > 0);

        let now = at(10, 8) + TimeDelta::minutes(10);
        let mut records = raw_day(10, ascending);
        records[9].sek_per_kwh = Some(f64::MAX);
        let outcome = dashboard.process(Region::Se3, records, now);
        assert!(matches!(outcome, Outcome::Empty(EmptyReason::CacheIntegrity)));
        assert_eq!(outcome.statistics(), Statistics::EMPTY);
        assert_eq!(dashboard.normalizer.n_cached(), 0);
        assert_eq!(dashboard.normalizer.stats().last_cleared_at, Some(now.with_timezone(&Utc)));
        assert_eq!(dashboard.categories.n_entries(), 0);
        assert_eq!(dashboard.categories.stats().last_cleared_at, Some(now.with_timezone(&Utc)));
        assert_eq!(dashboard.normalizer.stats().misses, 24);

        // Everything gets derived again:
        let _ = unwrap_report(dashboard.process(
            Region::Se3,
            raw_day(10, ascending),
            now + TimeDelta::minutes(10),
        ));
        assert_eq!(dashboard.normalizer.stats().misses, 48);
    }

    #[test]
    fn test_duplicate_documents() {
        let records = [raw_day(10, ascending), raw_day(10, ascending)].concat();
        let report = unwrap_report(Dashboard::default().process(Region::Se3, records, at(10, 8)));
        assert_eq!(report.selection.box_window.len(), 8);
        assert_eq!(report.selection.chart_window.len(), 16);
    }

    #[tokio::test]
    async fn test_refresh_with_tomorrow() -> Result {
        let source = Days(HashMap::from([
            (date(10), raw_day(10, ascending)),
            (date(11), raw_day(11, ascending)),
        ]));
        let report = unwrap_report(Dashboard::default().refresh(&source, Region::Se3, at(10, 23)).await?);
        assert_eq!(report.selection.box_window.len(), 8);
        assert_eq!(report.selection.box_window[1].start, at(11, 0));
        assert!(!report.selection.is_limited());
        Ok(())
    }

    #[tokio::test]
    async fn test_refresh_without_tomorrow() -> Result {
        let source = Days(HashMap::from([(date(10), raw_day(10, ascending))]));
        let report = unwrap_report(Dashboard::default().refresh(&source, Region::Se2, at(10, 20)).await?);
        assert_eq!(report.selection.box_window.len(), 4);
        assert!(report.selection.is_limited());
        Ok(())
    }

    #[tokio::test]
    async fn test_refresh_without_today_fails() {
        let source = Days(HashMap::from([(date(11), raw_day(11, ascending))]));
        assert!(Dashboard::default().refresh(&source, Region::Se3, at(10, 20)).await.is_err());
    }
}

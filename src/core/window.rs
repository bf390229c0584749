use chrono::{DateTime, DurationRound, NaiveTime, TimeDelta, TimeZone, Timelike};
use itertools::Itertools;

use crate::{core::record::NormalizedPriceRecord, prelude::*};

pub type Window = Vec<NormalizedPriceRecord>;

/// Where the selected windows start.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Anchor {
    /// The record of the current hour.
    CurrentHour,

    /// The first record at or after the next hour.
    NextAvailable,

    /// All the records are in the past, showing the latest ones.
    MostRecentPast,

    /// Nothing to show.
    Nothing,
}

#[must_use]
#[derive(Clone, Debug)]
pub struct Selection {
    pub anchor: Anchor,

    /// Short window for the compact hourly tiles.
    pub box_window: Window,

    /// Long window for the chart and the statistics.
    pub chart_window: Window,

    box_size: usize,
    chart_size: usize,
}

impl Selection {
    fn empty(box_size: usize, chart_size: usize) -> Self {
        Self {
            anchor: Anchor::Nothing,
            box_window: Vec::new(),
            chart_window: Vec::new(),
            box_size,
            chart_size,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.box_window.is_empty() && self.chart_window.is_empty()
    }

    /// Either window is shorter than requested.
    #[must_use]
    pub fn is_limited(&self) -> bool {
        self.box_window.len() < self.box_size || self.chart_window.len() < self.chart_size
    }
}

/// Decides which hourly records to display given the current time.
#[must_use]
#[derive(Copy, Clone, Debug, bon::Builder)]
pub struct WindowSelector {
    #[builder(default = 8)]
    pub box_size: usize,

    #[builder(default = 16)]
    pub chart_size: usize,

    /// From this hour on, the windows get topped up with the next day's records.
    #[builder(default = 22)]
    pub rollover_hour: u32,
}

impl Default for WindowSelector {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl WindowSelector {
    /// Select the box and chart windows.
    ///
    /// Pure in `(records, now)`: the input order does not matter.
    #[instrument(skip_all, fields(n_records = records.len(), now = %now))]
    pub fn select<Tz: TimeZone>(
        &self,
        records: &[NormalizedPriceRecord],
        now: &DateTime<Tz>,
    ) -> Selection
    where
        Tz::Offset: std::fmt::Display,
    {
        let mut records =
            records.iter().sorted_by_key(|record| record.timestamp).cloned().collect_vec();
        let n_records = records.len();
        records.dedup_by_key(|record| record.timestamp);
        if records.len() != n_records {
            warn!(n_duplicates = n_records - records.len(), "dropped duplicate hours");
        }

        let current_hour_start = truncate_to_hour(now);
        let current_timestamp = current_hour_start.timestamp_millis();
        let next_hour_timestamp = (current_hour_start + TimeDelta::hours(1)).timestamp_millis();

        let selection = if let Some(index) =
            records.iter().position(|record| record.timestamp == current_timestamp)
        {
            debug!(index, "using the current hour");
            let mut selection = self.slice(Anchor::CurrentHour, &records, index);
            if now.hour() >= self.rollover_hour {
                self.roll_over(&mut selection, &records, now);
            }
            selection
        } else if let Some(index) =
            records.iter().position(|record| record.timestamp >= next_hour_timestamp)
        {
            debug!(index, "using the next available hour");
            self.slice(Anchor::NextAvailable, &records, index)
        } else if records.iter().any(|record| record.timestamp < current_timestamp) {
            warn!("no current or upcoming prices, using the most recent past ones");
            Selection {
                anchor: Anchor::MostRecentPast,
                box_window: tail(&records, self.box_size),
                chart_window: tail(&records, self.chart_size),
                box_size: self.box_size,
                chart_size: self.chart_size,
            }
        } else {
            warn!("no valid price data for any time period");
            Selection::empty(self.box_size, self.chart_size)
        };

        if selection.box_window.len() < self.box_size {
            warn!(n_hours = selection.box_window.len(), "limited price data for the boxes");
        }
        if selection.chart_window.len() < self.chart_size {
            warn!(n_hours = selection.chart_window.len(), "limited price data for the chart");
        }
        selection
    }

    fn slice(&self, anchor: Anchor, records: &[NormalizedPriceRecord], start: usize) -> Selection {
        Selection {
            anchor,
            box_window: head(&records[start..], self.box_size),
            chart_window: head(&records[start..], self.chart_size),
            box_size: self.box_size,
            chart_size: self.chart_size,
        }
    }

    /// Top the short windows up with the next day's records.
    fn roll_over<Tz: TimeZone>(
        &self,
        selection: &mut Selection,
        records: &[NormalizedPriceRecord],
        now: &DateTime<Tz>,
    ) {
        let Some(tomorrow_timestamp) = next_day_start(now) else {
            warn!("failed to determine the next day start");
            return;
        };
        let tomorrow =
            records.iter().filter(|record| record.timestamp >= tomorrow_timestamp).collect_vec();
        if tomorrow.is_empty() {
            warn!("no prices for tomorrow yet");
            return;
        }
        info!(n_hours = tomorrow.len(), "found tomorrow's prices");
        top_up(&mut selection.box_window, &tomorrow, tomorrow_timestamp, self.box_size);
        top_up(&mut selection.chart_window, &tomorrow, tomorrow_timestamp, self.chart_size);
    }
}

fn top_up(
    window: &mut Window,
    tomorrow: &[&NormalizedPriceRecord],
    tomorrow_timestamp: i64,
    size: usize,
) {
    if window.len() >= size {
        return;
    }
    window.retain(|record| record.timestamp < tomorrow_timestamp);
    window.extend(tomorrow.iter().map(|record| (*record).clone()));
    window.truncate(size);
}

fn head(records: &[NormalizedPriceRecord], size: usize) -> Window {
    records.iter().take(size).cloned().collect()
}

fn tail(records: &[NormalizedPriceRecord], size: usize) -> Window {
    records[records.len().saturating_sub(size)..].to_vec()
}

fn truncate_to_hour<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    now.clone().duration_trunc(TimeDelta::hours(1)).unwrap_or_else(|_| now.clone())
}

/// Epoch milliseconds of the next calendar day's midnight in the `now`'s time zone.
fn next_day_start<Tz: TimeZone>(now: &DateTime<Tz>) -> Option<i64> {
    let date = now.date_naive().succ_opt()?;
    now.timezone()
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .map(|start| start.timestamp_millis())
}

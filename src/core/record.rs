use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use serde_with::serde_as;

use crate::quantity::price::{KilowattHourPrice, OrePerKilowattHour};

/// Hourly price record exactly as published by the upstream API.
///
/// Every field is optional here: malformed records must reach the validation
/// step instead of failing the whole document.
#[must_use]
#[serde_as]
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawPriceRecord {
    #[serde(default)]
    pub time_start: Option<String>,

    #[serde(default)]
    pub time_end: Option<String>,

    #[serde_as(as = "serde_with::DefaultOnError")]
    #[serde(rename = "SEK_per_kWh", default)]
    pub sek_per_kwh: Option<f64>,

    #[serde_as(as = "serde_with::DefaultOnError")]
    #[serde(rename = "EUR_per_kWh", default)]
    pub eur_per_kwh: Option<f64>,

    /// SEK/EUR exchange rate used by the publisher.
    #[serde_as(as = "serde_with::DefaultOnError")]
    #[serde(rename = "EXR", default)]
    pub exchange_rate: Option<f64>,
}

impl RawPriceRecord {
    pub fn new(time_start: impl Into<String>, sek_per_kwh: f64) -> Self {
        Self { time_start: Some(time_start.into()), sek_per_kwh: Some(sek_per_kwh), ..Self::default() }
    }
}

/// Validated record with the derived start timestamp and display price.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedPriceRecord {
    /// Upstream `time_start`, also the memoization key.
    pub time_start: String,

    pub start: DateTime<FixedOffset>,

    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,

    pub price: KilowattHourPrice,

    pub display_price: OrePerKilowattHour,
}

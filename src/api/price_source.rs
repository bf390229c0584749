use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Url;

use crate::core::{record::RawPriceRecord, region::Region};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum FetchError {
    #[display("failed to fetch `{url}` from any source")]
    Network { url: Url },

    #[display("`{url}` returned malformed price data")]
    InvalidFormat { url: Url, source: serde_json::Error },
}

/// Supplier of the raw day-ahead prices.
#[async_trait]
pub trait PriceSource: Sync {
    /// Get all the price records of the market day.
    async fn get_prices(
        &self,
        region: Region,
        on: NaiveDate,
    ) -> Result<Vec<RawPriceRecord>, FetchError>;
}

//! [Elpriset just nu](https://www.elprisetjustnu.se/elpris-api) client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{
    Client,
    Url,
    header::{ACCEPT, HeaderMap, HeaderValue},
};

use crate::{
    api::{FetchError, PriceSource},
    core::{record::RawPriceRecord, region::Region},
    prelude::*,
};

pub const DEFAULT_BASE_URL: &str = "https://www.elprisetjustnu.se/api/v1/prices";

/// Proxies to retry through when the direct request fails, the target goes into the `url` parameter.
pub const DEFAULT_PROXIES: [&str; 2] = ["https://api.allorigins.win/raw", "https://corsproxy.io/"];

pub struct Api {
    client: Client,
    base_url: Url,
    proxies: Vec<Url>,
}

impl Api {
    pub fn try_new(base_url: Url, proxies: Vec<Url>) -> Result<Self> {
        ensure!(!base_url.cannot_be_a_base(), "`{base_url}` cannot be a base URL");
        let headers = HeaderMap::from_iter([(ACCEPT, HeaderValue::from_static("application/json"))]);
        let client = Client::builder()
            .user_agent("elpris")
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, base_url, proxies })
    }

    /// For example: `…/api/v1/prices/2025/10-18_SE3.json`.
    #[must_use]
    pub fn price_url(&self, region: Region, on: NaiveDate) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `try_new`:
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(&on.format("%Y").to_string())
                .push(&format!("{}_{region}.json", on.format("%m-%d")));
        }
        url
    }

    async fn get_json(&self, url: Url) -> Result<serde_json::Value> {
        Ok(self.client.get(url).send().await?.error_for_status()?.json().await?)
    }

    async fn get_json_with_fallback(&self, url: &Url) -> Result<serde_json::Value, FetchError> {
        match self.get_json(url.clone()).await {
            Ok(body) => return Ok(body),
            Err(error) => warn!("direct fetch failed, trying the proxies…: {error:#}"),
        }
        for proxy in &self.proxies {
            let mut proxied = proxy.clone();
            proxied.query_pairs_mut().append_pair("url", url.as_str());
            match self.get_json(proxied).await {
                Ok(body) => {
                    info!(%proxy, "fetched through the proxy");
                    return Ok(body);
                }
                Err(error) => warn!(%proxy, "proxy failed: {error:#}"),
            }
        }
        Err(FetchError::Network { url: url.clone() })
    }
}

#[async_trait]
impl PriceSource for Api {
    #[instrument(skip_all, fields(region = %region, on = %on))]
    async fn get_prices(
        &self,
        region: Region,
        on: NaiveDate,
    ) -> Result<Vec<RawPriceRecord>, FetchError> {
        info!("fetching…");
        let url = self.price_url(region, on);
        let body = self.get_json_with_fallback(&url).await?;
        let records = serde_json::from_value::<Vec<RawPriceRecord>>(body)
            .map_err(|source| FetchError::InvalidFormat { url, source })?;
        info!(n_records = records.len(), "fetched");
        Ok(records)
    }
}

use clap::Parser;
use reqwest::Url;

use crate::{api::elprisetjustnu, prelude::*};

#[derive(Parser)]
pub struct SourceArgs {
    #[clap(
        long = "api-base-url",
        env = "ELPRIS_API_BASE_URL",
        default_value = elprisetjustnu::DEFAULT_BASE_URL,
    )]
    base_url: Url,

    /// Proxies to retry through when the direct request fails.
    #[clap(
        long = "proxies",
        env = "ELPRIS_PROXIES",
        value_delimiter = ',',
        num_args = 0..,
        default_values = elprisetjustnu::DEFAULT_PROXIES,
    )]
    proxies: Vec<String>,
}

impl SourceArgs {
    pub fn try_new_api(&self) -> Result<elprisetjustnu::Api> {
        let proxies = self
            .proxies
            .iter()
            .filter(|proxy| !proxy.is_empty())
            .map(|proxy| Url::parse(proxy).with_context(|| format!("invalid proxy URL `{proxy}`")))
            .collect::<Result<_>>()?;
        elprisetjustnu::Api::try_new(self.base_url.clone(), proxies)
    }
}

use std::time::Duration;

use chrono::Local;
use clap::Parser;
use tokio::time::{MissedTickBehavior, interval};

use crate::{
    cli::{show::print_outcome, source::SourceArgs, window::WindowArgs},
    core::{dashboard::Dashboard, region::Region},
    preferences::PreferenceStore,
    prelude::*,
};

#[derive(Parser)]
pub struct WatchArgs {
    /// Price area, defaults to the stored preference re-read on every refresh.
    #[clap(long, env = "ELPRIS_REGION")]
    region: Option<Region>,

    #[clap(long, env = "ELPRIS_REFRESH_INTERVAL", default_value = "10min")]
    interval: humantime::Duration,

    #[clap(flatten)]
    window: WindowArgs,

    #[clap(flatten)]
    source: SourceArgs,
}

impl WatchArgs {
    /// Refresh forever, a failed cycle does not stop the loop.
    pub async fn run(self, preferences: &PreferenceStore) -> Result {
        let api = self.source.try_new_api()?;
        let period: Duration = self.interval.into();
        let mut dashboard = Dashboard::new(self.window.selector());

        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            let region = self.region.unwrap_or_else(|| preferences.get_region());
            let now = Local::now().fixed_offset();
            match dashboard.refresh(&api, region, now).await {
                Ok(outcome) => {
                    print_outcome(&outcome, preferences.get_theme());
                    println!("Updated at {}", now.format("%H:%M"));
                }
                Err(error) => error!("failed to refresh the prices: {error:#}"),
            }
        }
    }
}

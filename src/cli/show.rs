use chrono::{DateTime, FixedOffset, Local};
use clap::Parser;

use crate::{
    cli::{source::SourceArgs, window::WindowArgs},
    core::{
        dashboard::{Dashboard, Outcome},
        region::Region,
        window::Anchor,
    },
    preferences::{PreferenceStore, Theme},
    prelude::*,
    tables::{build_chart_table, build_empty_table, build_statistics_table, build_tiles_table},
};

#[derive(Parser)]
pub struct ShowArgs {
    /// Price area, defaults to the stored preference.
    #[clap(long, env = "ELPRIS_REGION")]
    region: Option<Region>,

    /// Pretend the current time is this one, for example: `2025-10-18T23:00:00+02:00`.
    #[clap(long)]
    at: Option<DateTime<FixedOffset>>,

    #[clap(flatten)]
    window: WindowArgs,

    #[clap(flatten)]
    source: SourceArgs,
}

impl ShowArgs {
    pub async fn run(self, preferences: &PreferenceStore) -> Result {
        let api = self.source.try_new_api()?;
        let region = self.region.unwrap_or_else(|| preferences.get_region());
        let now = self.at.unwrap_or_else(|| Local::now().fixed_offset());
        let outcome =
            Dashboard::new(self.window.selector()).refresh(&api, region, now).await?;
        print_outcome(&outcome, preferences.get_theme());
        Ok(())
    }
}

pub fn print_outcome(outcome: &Outcome, theme: Option<Theme>) {
    match outcome {
        Outcome::Report(report) => {
            let anchor = match report.selection.anchor {
                Anchor::CurrentHour => "from the current hour",
                Anchor::NextAvailable => "from the next available hour",
                Anchor::MostRecentPast => "latest known prices, no current data",
                Anchor::Nothing => "nothing to show",
            };
            println!("{}: {anchor}", report.region);
            println!("{}", build_tiles_table(report, theme));
            println!("{}", build_chart_table(report, theme));
            if report.selection.is_limited() {
                println!("Limited price data available.");
            }
        }
        Outcome::Empty(reason) => {
            println!("{}", build_empty_table(*reason));
        }
    }
    println!("{}", build_statistics_table(&outcome.statistics()));
}

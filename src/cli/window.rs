use clap::Parser;

use crate::core::window::WindowSelector;

#[derive(Parser)]
pub struct WindowArgs {
    /// Number of hourly tiles.
    #[clap(long, env = "ELPRIS_BOX_SIZE", default_value = "8")]
    box_size: usize,

    /// Number of hours on the chart and in the statistics.
    #[clap(long, env = "ELPRIS_CHART_SIZE", default_value = "16")]
    chart_size: usize,

    /// Hour from which tomorrow's prices are spliced in.
    #[clap(long, env = "ELPRIS_ROLLOVER_HOUR", default_value = "22")]
    rollover_hour: u32,
}

impl WindowArgs {
    pub fn selector(&self) -> WindowSelector {
        WindowSelector::builder()
            .box_size(self.box_size)
            .chart_size(self.chart_size)
            .rollover_hour(self.rollover_hour)
            .build()
    }
}

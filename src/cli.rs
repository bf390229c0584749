mod preferences;
mod show;
mod source;
mod watch;
mod window;

use clap::{Parser, Subcommand};

pub use self::{
    preferences::{PreferencesArgs, RegionArgs, ThemeArgs},
    show::ShowArgs,
    watch::WatchArgs,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[clap(flatten)]
    pub preferences: PreferencesArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch the prices once and print them.
    #[clap(name = "show")]
    Show(Box<ShowArgs>),

    /// Keep refreshing the prices periodically.
    #[clap(name = "watch")]
    Watch(Box<WatchArgs>),

    /// Show or change the preferred price area.
    #[clap(name = "region")]
    Region(RegionArgs),

    /// Show or change the preferred colour theme.
    #[clap(name = "theme")]
    Theme(ThemeArgs),
}

#![allow(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]

mod api;
mod cli;
mod core;
mod preferences;
mod prelude;
mod quantity;
mod tables;

use clap::{Parser, crate_version};

use crate::{
    cli::{Args, Command},
    prelude::*,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    let args = Args::parse();
    let mut preferences = args.preferences.open();

    match args.command {
        Command::Show(args) => args.run(&preferences).await?,
        Command::Watch(args) => args.run(&preferences).await?,
        Command::Region(args) => args.run(&mut preferences)?,
        Command::Theme(args) => args.run(&mut preferences)?,
    }

    info!("done!");
    Ok(())
}

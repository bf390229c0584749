use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{
    core::region::Region,
    preferences::{PreferenceStore, Theme, TomlFile},
    prelude::*,
};

#[derive(Parser)]
pub struct PreferencesArgs {
    #[clap(long = "preferences-path", env = "ELPRIS_PREFERENCES_PATH", default_value = "elpris.toml")]
    path: PathBuf,

    /// Written alongside the primary file and read when it has no valid value.
    #[clap(
        long = "preferences-backup-path",
        env = "ELPRIS_PREFERENCES_BACKUP_PATH",
        default_value = ".elpris.backup.toml"
    )]
    backup_path: PathBuf,
}

impl PreferencesArgs {
    pub fn open(&self) -> PreferenceStore {
        PreferenceStore::new(vec![
            Box::new(TomlFile::new("primary", &self.path)),
            Box::new(TomlFile::new("backup", &self.backup_path)),
        ])
    }
}

#[derive(Parser)]
pub struct RegionArgs {
    #[command(subcommand)]
    command: Option<RegionCommand>,
}

#[derive(Subcommand)]
enum RegionCommand {
    /// Print the preferred price area.
    Get,

    /// Change the preferred price area.
    Set { region: Region },
}

impl RegionArgs {
    pub fn run(self, preferences: &mut PreferenceStore) -> Result {
        match self.command.unwrap_or(RegionCommand::Get) {
            RegionCommand::Get => {
                let region = preferences.get_region();
                println!("{region}: {}", region.description());
            }
            RegionCommand::Set { region } => {
                preferences.set_region(region)?;
                info!(%region, "saved");
            }
        }
        Ok(())
    }
}

#[derive(Parser)]
pub struct ThemeArgs {
    #[command(subcommand)]
    command: Option<ThemeCommand>,
}

#[derive(Subcommand)]
enum ThemeCommand {
    /// Print the preferred theme.
    Get,

    /// Change the preferred theme.
    Set { theme: Theme },
}

impl ThemeArgs {
    pub fn run(self, preferences: &mut PreferenceStore) -> Result {
        match self.command.unwrap_or(ThemeCommand::Get) {
            ThemeCommand::Get => match preferences.get_theme() {
                Some(theme) => println!("{theme}"),
                None => println!("no preference, using the terminal default"),
            },
            ThemeCommand::Set { theme } => {
                preferences.set_theme(theme)?;
                info!(%theme, "saved");
            }
        }
        Ok(())
    }
}

mod backend;
mod theme;

use std::str::FromStr;

#[cfg(test)]
pub use self::backend::Memory;
pub use self::{
    backend::{Backend, TomlFile},
    theme::Theme,
};
use crate::{core::region::Region, prelude::*};

pub const REGION_KEY: &str = "region";
pub const THEME_KEY: &str = "theme";

/// Preferences layered over backends in priority order.
///
/// Reads stop at the first backend holding a valid value, writes go to all of them.
pub struct PreferenceStore {
    backends: Vec<Box<dyn Backend>>,
}

impl PreferenceStore {
    pub fn new(backends: Vec<Box<dyn Backend>>) -> Self {
        Self { backends }
    }

    pub fn get_region(&self) -> Region {
        self.get(REGION_KEY).unwrap_or_default()
    }

    pub fn set_region(&mut self, region: Region) -> Result {
        self.set(REGION_KEY, region.code())
    }

    /// Stored theme, `None` means no preference.
    pub fn get_theme(&self) -> Option<Theme> {
        self.get(THEME_KEY)
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result {
        self.set(THEME_KEY, theme.code())
    }

    fn get<T: FromStr>(&self, key: &str) -> Option<T> {
        for backend in &self.backends {
            match backend.get(key) {
                Ok(Some(value)) => match value.parse() {
                    Ok(value) => return Some(value),
                    Err(_) => warn!(backend = backend.name(), key, %value, "ignoring invalid value"),
                },
                Ok(None) => {}
                Err(error) => warn!(backend = backend.name(), key, "failed to read: {error:#}"),
            }
        }
        None
    }

    #[instrument(skip_all, fields(key = key, value = value))]
    fn set(&mut self, key: &str, value: &str) -> Result {
        let mut n_written = 0;
        for backend in &mut self.backends {
            match backend.set(key, value) {
                Ok(()) => n_written += 1,
                Err(error) => warn!(backend = backend.name(), "failed to write: {error:#}"),
            }
        }
        ensure!(n_written != 0, "no preference backend accepted `{key}`");
        debug!(n_written, "saved");
        Ok(())
    }
}

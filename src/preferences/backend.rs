#[cfg(test)]
use std::collections::HashMap;
use std::{fs, path::PathBuf};

use crate::prelude::*;

/// Key-value storage of the string preferences.
pub trait Backend {
    fn name(&self) -> &'static str;

    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result;
}

/// Flat TOML table in a file.
pub struct TomlFile {
    name: &'static str,
    path: PathBuf,
}

impl TomlFile {
    pub fn new(name: &'static str, path: impl Into<PathBuf>) -> Self {
        Self { name, path: path.into() }
    }

    fn read(&self) -> Result<toml::Table> {
        if !self.path.is_file() {
            return Ok(toml::Table::new());
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read `{}`", self.path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse `{}`", self.path.display()))
    }
}

impl Backend for TomlFile {
    fn name(&self) -> &'static str {
        self.name
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read()?.get(key).and_then(toml::Value::as_str).map(ToOwned::to_owned))
    }

    fn set(&mut self, key: &str, value: &str) -> Result {
        let mut table = self.read().unwrap_or_else(|error| {
            warn!(backend = self.name, "overwriting the unreadable preferences: {error:#}");
            toml::Table::new()
        });
        table.insert(key.to_string(), toml::Value::String(value.to_string()));
        fs::write(&self.path, toml::to_string(&table)?)
            .with_context(|| format!("failed to write `{}`", self.path.display()))
    }
}

/// Non-persistent backend.
#[cfg(test)]
#[derive(Default)]
pub struct Memory(HashMap<String, String>);

#[cfg(test)]
impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Memory {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
    }
}

#[cfg(test)]
impl Backend for Memory {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.0.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result {
        self.0.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(format!("elpris-{}-{name}.toml", std::process::id()))
    }

    #[test]
    fn test_toml_file_round_trip() -> Result {
        let path = temp_path("round-trip");
        let mut backend = TomlFile::new("test", &path);
        assert_eq!(backend.get("region")?, None);
        backend.set("region", "SE1")?;
        backend.set("theme", "dark")?;
        backend.set("region", "SE4")?;
        assert_eq!(backend.get("region")?.as_deref(), Some("SE4"));
        assert_eq!(backend.get("theme")?.as_deref(), Some("dark"));
        fs::remove_file(&path)?;
        Ok(())
    }

    #[test]
    fn test_toml_file_corrupted() -> Result {
        let path = temp_path("corrupted");
        fs::write(&path, "region = ")?;
        let mut backend = TomlFile::new("test", &path);
        assert!(backend.get("region").is_err());
        backend.set("region", "SE2")?;
        assert_eq!(backend.get("region")?.as_deref(), Some("SE2"));
        fs::remove_file(&path)?;
        Ok(())
    }
}

//! File-backed key/value store, the command-line stand-in for browser local storage

use crate::error::Result;
use log::debug;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Every write replaces the stored value for a key wholesale and rewrites the file.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let entries = self.read_all()?;
        match entries.get(key) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), serde_json::to_value(value)?);
        self.write_all(&entries)?;
        debug!("Stored '{}' in {}", key, self.path.display());
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.read_all()?.contains_key(key))
    }

    fn read_all(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_all(&self, entries: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }
}

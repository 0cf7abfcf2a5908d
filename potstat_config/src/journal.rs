//! Persistent journal of electrode properties.
//!
//! Entries are keyed by `(file, start, electrode)`: the run's file identity,
//! its start timestamp in whole seconds since the epoch, and the electrode the
//! properties belong to. The file is plain TOML (`[[entries]]` tables).

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ElectrodeCfg;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ElectrodeKey {
    Working,
    Counter,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct JournalEntry {
    pub id: u32,
    pub file: String,
    pub start: i64,
    pub electrode: ElectrodeKey,
    #[serde(default)]
    pub properties: ElectrodeCfg,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Journal {
    #[serde(default)]
    pub entries: Vec<JournalEntry>,
}

impl Journal {
    /// Read a journal file. A missing file is an empty journal.
    pub fn load(path: &Path) -> eyre::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("read journal {:?}: {}", path, e))?;
        toml::from_str(&text).map_err(|e| eyre::eyre!("parse journal {:?}: {}", path, e))
    }

    pub fn save(&self, path: &Path) -> eyre::Result<()> {
        let text = toml::to_string_pretty(self)
            .map_err(|e| eyre::eyre!("serialize journal: {}", e))?;
        std::fs::write(path, text).map_err(|e| eyre::eyre!("write journal {:?}: {}", path, e))
    }

    pub fn lookup(&self, file: &str, start: i64, electrode: ElectrodeKey) -> Option<&JournalEntry> {
        self.entries
            .iter()
            .find(|e| e.file == file && e.start == start && e.electrode == electrode)
    }

    /// Insert or replace the properties for a key; returns the entry id.
    pub fn upsert(
        &mut self,
        file: &str,
        start: i64,
        electrode: ElectrodeKey,
        properties: ElectrodeCfg,
    ) -> u32 {
        if let Some(e) = self
            .entries
            .iter_mut()
            .find(|e| e.file == file && e.start == start && e.electrode == electrode)
        {
            e.properties = properties;
            return e.id;
        }
        let id = self.entries.iter().map(|e| e.id).max().map_or(1, |m| m + 1);
        self.entries.push(JournalEntry {
            id,
            file: file.to_string(),
            start,
            electrode,
            properties,
        });
        id
    }

    /// Remove an entry by id; returns whether anything was removed.
    pub fn delete(&mut self, id: u32) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }
}

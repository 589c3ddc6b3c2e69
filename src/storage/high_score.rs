//! High score persistence
//!
//! The score lives in a small JSON object of string keys mapped to integers,
//! so the file can be shared with other settings. Storage problems never
//! reach the game: an unreadable score counts as 0 and a failed write is
//! logged and dropped.

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, warn};

/// Somewhere the high score survives between runs
pub trait HighScoreStore {
    /// Stored high score, 0 if there is none or it cannot be read
    fn load_high_score(&self) -> u32;

    /// Persist a new high score, best effort
    fn save_high_score(&mut self, value: u32);
}

/// High score kept under a key in a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    key: String,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored score, `Ok(None)` if the file or key is missing
    pub fn try_load(&self) -> Result<Option<u32>> {
        let entries = self.read_entries()?;
        match entries.get(&self.key) {
            None => Ok(None),
            Some(value) => parse_score(value)
                .map(Some)
                .with_context(|| format!("Bad value for {:?} in {:?}", self.key, self.path)),
        }
    }

    /// Write the score, keeping any other keys in the file
    pub fn try_save(&self, value: u32) -> Result<()> {
        // A corrupt file is replaced rather than blocking the save
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(self.key.clone(), Value::from(value));
        self.write_entries(&entries)
    }

    fn read_entries(&self) -> Result<Map<String, Value>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to read {:?}", self.path));
            }
        };

        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {:?} as a JSON object", self.path))
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(entries).context("Failed to serialize scores")?;

        // Write beside the target and rename so a crash never leaves half a file
        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, json).with_context(|| format!("Failed to write {:?}", tmp))?;
        if let Err(err) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(err).with_context(|| format!("Failed to replace {:?}", self.path));
        }

        Ok(())
    }
}

impl HighScoreStore for JsonFileStore {
    fn load_high_score(&self) -> u32 {
        match self.try_load() {
            Ok(value) => {
                let value = value.unwrap_or(0);
                debug!(path = ?self.path, value, "high score loaded");
                value
            }
            Err(err) => {
                warn!(error = %format!("{err:#}"), "high score unreadable, starting from 0");
                0
            }
        }
    }

    fn save_high_score(&mut self, value: u32) {
        match self.try_save(value) {
            Ok(()) => debug!(path = ?self.path, value, "high score saved"),
            Err(err) => warn!(error = %format!("{err:#}"), "failed to save high score"),
        }
    }
}

/// Accepts a JSON number or a numeric string
fn parse_score(value: &Value) -> Result<u32> {
    let parsed = match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    };
    match parsed {
        Some(score) => Ok(score),
        None => bail!("expected a non-negative integer, got {value}"),
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    value: Option<u32>,
    writes: usize,
}

/// In-process store. Clones share the same value.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_high_score(value: u32) -> Self {
        let store = Self::new();
        store.inner.borrow_mut().value = Some(value);
        store
    }

    pub fn value(&self) -> Option<u32> {
        self.inner.borrow().value
    }

    /// Number of saves made through any clone
    pub fn writes(&self) -> usize {
        self.inner.borrow().writes
    }
}

impl HighScoreStore for MemoryStore {
    fn load_high_score(&self) -> u32 {
        self.value().unwrap_or(0)
    }

    fn save_high_score(&mut self, value: u32) {
        let mut inner = self.inner.borrow_mut();
        inner.value = Some(value);
        inner.writes += 1;
    }
}

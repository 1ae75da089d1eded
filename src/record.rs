//! Record - сериализуемая запись метаданных одного файла.
//!
//! Формат: плоский JSON-объект. Зарезервированы два ключа:
//! - `last_modified` - mtime host-файла (ms since epoch) на момент записи;
//! - `last_size` - размер host-файла в байтах на момент записи.
//!
//! Остальные ключи принадлежат producer'у и store их не интерпретирует.

use std::collections::BTreeMap;
use std::fs::Metadata;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::consts::{KEY_LAST_MODIFIED, KEY_LAST_SIZE, RESERVED_KEYS};
use crate::error::{MetaError, Result};
use crate::util::to_epoch_millis;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub last_modified: i64,
    #[serde(default)]
    pub last_size: u64,
    #[serde(flatten)]
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(last_modified: i64, last_size: u64) -> Self {
        Self {
            last_modified,
            last_size,
            fields: BTreeMap::new(),
        }
    }

    /// Record stamped with the host file's current mtime and size.
    pub fn for_file(path: &Path) -> Result<Self> {
        let md = std::fs::metadata(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MetaError::MissingFile {
                    path: path.to_path_buf(),
                }
            } else {
                MetaError::io(path.display().to_string(), e)
            }
        })?;
        Ok(Self::from_metadata(&md))
    }

    pub fn from_metadata(md: &Metadata) -> Self {
        let mtime = md.modified().map(to_epoch_millis).unwrap_or(0);
        Self::new(mtime, md.len())
    }

    /// Builder-style producer field.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a field. Reserved keys are routed to the typed fields; a value of
    /// the wrong type for a reserved key is ignored.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        match key {
            KEY_LAST_MODIFIED => {
                if let Some(v) = value.as_i64() {
                    self.last_modified = v;
                }
            }
            KEY_LAST_SIZE => {
                if let Some(v) = value.as_u64() {
                    self.last_size = v;
                }
            }
            _ => {
                self.fields.insert(key.to_string(), value);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        match key {
            KEY_LAST_MODIFIED => Some(Value::from(self.last_modified)),
            KEY_LAST_SIZE => Some(Value::from(self.last_size)),
            _ => self.fields.get(key).cloned(),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        if RESERVED_KEYS.contains(&key) {
            return None;
        }
        self.fields.remove(key)
    }

    /// Producer-defined fields (reserved keys excluded).
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// true, если mtime (до секунды) и размер совпадают с текущим stat файла.
    pub fn is_fresh_for(&self, md: &Metadata) -> bool {
        let cur = Self::from_metadata(md);
        self.last_size == cur.last_size
            && self.last_modified.div_euclid(1000) == cur.last_modified.div_euclid(1000)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}

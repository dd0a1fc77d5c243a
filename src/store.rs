use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use log::{debug, warn};
use serde_json::Value;

use crate::config::Settings;
use crate::error::StoreError;
use crate::models::group::Group;
use crate::util::{read_slot_from_file, save_slot_to_file};

/// The persisted slot holding the whole group collection.
///
/// There is no partial update and no compare-and-swap: `write` replaces
/// everything, so when two read-modify-write cycles overlap the later write
/// wins and the earlier mutation is lost.
#[async_trait]
pub trait GroupStore: Send + Sync {
    /// Empty when the slot is absent or unreadable as a collection.
    async fn read(&self) -> Result<Vec<Group>, StoreError>;

    async fn write(&self, groups: &[Group]) -> Result<(), StoreError>;
}

/// Decodes the slot text record by record. Records without an integer `id`
/// or a string `name` are skipped, as are repeated ids; `urls` that is not an
/// array reads as empty and non-string entries are dropped.
pub fn decode_groups(raw: &str) -> Vec<Group> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("Stored groups are not valid JSON, treating as empty: {}", e);
            return Vec::new();
        }
    };
    let records = match value {
        Value::Array(records) => records,
        other => {
            warn!("Stored groups are not a list (found {}), treating as empty", json_kind(&other));
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut groups = Vec::with_capacity(records.len());
    for record in records {
        let Some(group) = decode_group(&record) else {
            debug!("Skipping malformed group record: {}", record);
            continue;
        };
        if !seen.insert(group.id) {
            warn!("Skipping group with repeated id {}", group.id);
            continue;
        }
        groups.push(group);
    }
    groups
}

fn decode_group(record: &Value) -> Option<Group> {
    let id = record.get("id")?.as_i64()?;
    let name = record.get("name")?.as_str()?.to_string();
    let urls = match record.get("urls") {
        Some(Value::Array(urls)) => urls
            .iter()
            .filter_map(|url| url.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    };
    Some(Group { id, name, urls })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub fn encode_groups(groups: &[Group]) -> Result<String, StoreError> {
    Ok(serde_json::to_string(groups)?)
}

/// Slot kept in process memory as its serialized text.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Starts with `raw` already in the slot, as if written by someone else.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        MemoryStore {
            slot: Mutex::new(Some(raw.into())),
        }
    }

    pub fn with_groups(groups: &[Group]) -> Result<Self, StoreError> {
        Ok(MemoryStore::with_raw(encode_groups(groups)?))
    }

    /// Exact slot contents, `None` if never written.
    pub fn raw(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl GroupStore for MemoryStore {
    async fn read(&self) -> Result<Vec<Group>, StoreError> {
        Ok(self.raw().map(|raw| decode_groups(&raw)).unwrap_or_default())
    }

    async fn write(&self, groups: &[Group]) -> Result<(), StoreError> {
        let encoded = encode_groups(groups)?;
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(encoded);
        Ok(())
    }
}

/// Slot stored as `<data_dir>/<slot_key>.json`. Each write first copies the
/// previous file to `<data_dir>/history/` as a backup, pruned per the settings.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
    settings: Settings,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>, settings: Settings) -> Self {
        FileStore {
            data_dir: data_dir.into(),
            settings,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.settings.slot_key)
    }

    pub fn path(&self) -> PathBuf {
        self.data_dir.join(self.file_name())
    }
}

#[async_trait]
impl GroupStore for FileStore {
    async fn read(&self) -> Result<Vec<Group>, StoreError> {
        let data_dir = self.data_dir.clone();
        let file_name = self.file_name();
        let raw = tokio::task::spawn_blocking(move || read_slot_from_file(&data_dir, &file_name))
            .await
            .map_err(|e| StoreError::Io(std::io::Error::other(e)))??;
        Ok(raw.map(|raw| decode_groups(&raw)).unwrap_or_default())
    }

    async fn write(&self, groups: &[Group]) -> Result<(), StoreError> {
        let encoded = encode_groups(groups)?;
        let data_dir = self.data_dir.clone();
        let file_name = self.file_name();
        let settings = self.settings.clone();
        tokio::task::spawn_blocking(move || save_slot_to_file(&data_dir, &file_name, &encoded, &settings))
            .await
            .map_err(|e| StoreError::Io(std::io::Error::other(e)))??;
        debug!("Wrote {} groups to {:?}", groups.len(), self.path());
        Ok(())
    }
}

use serde::{Serialize, Deserialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use log::warn;

pub const DEFAULT_CONFIG_PATH: &str = "./config/appsettings.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotateType {
    // keep at most `rotate_count` history snapshots
    #[serde(rename = "history_count")]
    HistoryCount,
    // by days, delete history snapshots older than `rotate_time`
    #[serde(rename = "stored_time")]
    StoredTime,
    // by MB, delete oldest snapshots until the history directory fits `rotate_size`
    #[serde(rename = "total_size")]
    TotalSize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings  {
    pub rotate_type: RotateType,
    pub rotate_count: u32,
    pub rotate_time: u32,
    pub rotate_size: u32,
    /// Name of the persisted slot holding the whole group collection.
    pub slot_key: String,
    /// How long open-group waits for tab creations before reporting.
    pub open_grace_period_ms: u64,
}

impl Settings  {
    pub fn new() -> Self {
        Settings  {
            rotate_type: RotateType::HistoryCount,
            rotate_count: 100,
            rotate_time: 30,
            rotate_size: 200,
            slot_key: String::from("tabGroups"),
            open_grace_period_ms: 120,
        }
    }

    pub fn from_file(filename: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(filename)?;
        let settings: Settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }

    pub fn open_grace_period(&self) -> Duration {
        Duration::from_millis(self.open_grace_period_ms)
    }

    pub fn rotate_size_bytes(&self) -> u64 {
        self.rotate_size as u64 * 1024 * 1024
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings::new()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub settings: Settings,
}

impl Config{
    pub fn new() -> Self {
        Config::from_path(DEFAULT_CONFIG_PATH)
    }

    /// Loads the config at `path`, using defaults when it is missing or invalid.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let config_string = match fs::read_to_string(path) {
            Ok(value) => value,
            Err(_) => {
                warn!("No config at {:?}, using defaults", path);
                return Config::default();
            }
        };
        match serde_json::from_str(&config_string) {
            Ok(value) => value,
            Err(e) => {
                warn!("Invalid config at {:?}: {}, using defaults", path, e);
                Config::default()
            }
        }
    }
}

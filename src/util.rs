//! File slot storage. Before each overwrite the previous slot file is copied
//! to `history/<unix time>/` as a backup and old backups are pruned. Nothing in
//! the vault reads these copies back.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use log::{debug, info, warn};
use tempfile::NamedTempFile;
use crate::config::{RotateType, Settings};

pub const HISTORY_DIR: &str = "history";

/// Snapshot directories under `history/`, oldest first. Directory names are
/// the unix time of the snapshot; anything else in there is ignored.
fn list_history(history_dir: &Path) -> Result<Vec<(i64, PathBuf)>, io::Error> {
    if !history_dir.exists() {
        return Ok(Vec::new());
    }
    let mut entries = Vec::new();
    for entry in fs::read_dir(history_dir)? {
        let path = entry?.path();
        let stamp = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.parse::<i64>().ok());
        if let Some(stamp) = stamp {
            entries.push((stamp, path));
        }
    }
    entries.sort();
    Ok(entries)
}

/// Another writer may have pruned the same snapshot first.
fn remove_snapshot(path: &Path) -> Result<(), io::Error> {
    match fs::remove_dir_all(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

fn dir_size(path: &Path) -> Result<u64, io::Error> {
    let metadata = fs::metadata(path)?;
    if metadata.is_file() {
        return Ok(metadata.len());
    }
    let mut total = 0;
    for entry in fs::read_dir(path)? {
        total += dir_size(&entry?.path())?;
    }
    Ok(total)
}

fn remove_old_history_by_count(history_dir: &Path, settings: &Settings) -> Result<(), io::Error> {
    let entries = list_history(history_dir)?;
    let keep = settings.rotate_count as usize;
    if entries.len() > keep {
        for (_, path) in &entries[..entries.len() - keep] {
            debug!("Removing history snapshot {:?}", path);
            remove_snapshot(path)?;
        }
    }
    Ok(())
}

fn remove_old_history_by_size(history_dir: &Path, settings: &Settings) -> Result<(), io::Error> {
    let entries = list_history(history_dir)?;
    let mut sizes = Vec::with_capacity(entries.len());
    let mut total_size = 0;
    for (_, path) in &entries {
        let size = dir_size(path)?;
        total_size += size;
        sizes.push(size);
    }
    let limit = settings.rotate_size_bytes();
    for ((_, path), size) in entries.iter().zip(sizes) {
        if total_size <= limit {
            break;
        }
        debug!("Removing history snapshot {:?} ({} bytes)", path, size);
        remove_snapshot(path)?;
        total_size -= size;
    }
    Ok(())
}

fn remove_old_history_by_time(history_dir: &Path, settings: &Settings, now: i64) -> Result<(), io::Error> {
    let max_age = settings.rotate_time as i64 * 24 * 60 * 60;
    for (stamp, path) in list_history(history_dir)? {
        if now - stamp > max_age {
            debug!("Removing expired history snapshot {:?}", path);
            remove_snapshot(&path)?;
        }
    }
    Ok(())
}

pub fn rotate_history(history_dir: &Path, settings: &Settings, now: i64) -> Result<(), io::Error> {
    match settings.rotate_type {
        RotateType::HistoryCount => remove_old_history_by_count(history_dir, settings),
        RotateType::StoredTime => remove_old_history_by_time(history_dir, settings, now),
        RotateType::TotalSize => remove_old_history_by_size(history_dir, settings),
    }
}

/// Copies the current slot file into `history/<unix time>/` before it gets
/// replaced, then applies the configured rotation. One snapshot per second at most.
pub fn move_file_to_history(data_dir: &Path, filename: &str, settings: &Settings) -> Result<(), io::Error> {
    let source = data_dir.join(filename);
    if !source.exists() {
        return Ok(());
    }

    let unix_time = chrono::Utc::now().timestamp();
    let history_root = data_dir.join(HISTORY_DIR);
    let snapshot_dir = history_root.join(unix_time.to_string());
    if !snapshot_dir.exists() {
        fs::create_dir_all(&snapshot_dir)?;
        fs::copy(&source, snapshot_dir.join(filename))?;
        info!("Archived {:?} to {:?}", source, snapshot_dir);
    }

    rotate_history(&history_root, settings, unix_time)
}

/// Replaces the slot file in one rename. Each call stages into its own temp
/// file, so overlapping writers never touch each other's staging. A failed
/// backup is logged and does not fail the write.
pub fn save_slot_to_file(data_dir: &Path, filename: &str, contents: &str, settings: &Settings) -> Result<(), io::Error> {
    if let Err(e) = move_file_to_history(data_dir, filename, settings) {
        warn!("Failed to back up {} before writing: {}", filename, e);
    }
    let mut staging = NamedTempFile::new_in(data_dir)?;
    staging.write_all(contents.as_bytes())?;
    staging.persist(data_dir.join(filename)).map_err(|e| e.error)?;
    Ok(())
}

/// `Ok(None)` when the slot was never written.
pub fn read_slot_from_file(data_dir: &Path, filename: &str) -> Result<Option<String>, io::Error> {
    match fs::read_to_string(data_dir.join(filename)) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

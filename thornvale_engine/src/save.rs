//! Save-file management.
//!
//! Snapshots are flat JSON text produced by the engine; this module only
//! handles where they live on disk and how slots are named and listed.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};

pub const SAVE_DIR: &str = "saved_games";
const SAVE_PREFIX: &str = "thornvale-";

/// Reduce a requested slot name to filesystem-safe characters.
pub fn sanitize_slot(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() { "quick".to_string() } else { cleaned }
}

pub fn slot_path(dir: &Path, slot: &str) -> PathBuf {
    dir.join(format!("{SAVE_PREFIX}{}.json", sanitize_slot(slot)))
}

/// Write a snapshot into `dir`, creating it if needed.
///
/// # Errors
/// Fails on filesystem errors (directory creation or write).
pub fn write_snapshot_in(dir: &Path, slot: &str, snapshot: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = slot_path(dir, slot);
    fs::write(&path, snapshot).with_context(|| format!("writing {}", path.display()))?;
    info!("game saved to {}", path.display());
    Ok(path)
}

/// Read the snapshot for a slot from `dir`.
///
/// # Errors
/// Fails if the slot file does not exist or cannot be read.
pub fn read_snapshot_in(dir: &Path, slot: &str) -> Result<String> {
    let path = slot_path(dir, slot);
    fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))
}

/// Discover save slots stored in `dir`, sorted by name.
pub fn list_slots_in(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut slots: Vec<String> = entries
        .filter_map(std::result::Result::ok)
        .filter_map(|entry| {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                return None;
            }
            let stem = path.file_stem()?.to_str()?;
            stem.strip_prefix(SAVE_PREFIX).map(str::to_string)
        })
        .collect();
    slots.sort_unstable();
    slots
}

/// Convenience wrappers over the default save directory.
pub fn write_snapshot(slot: &str, snapshot: &str) -> Result<PathBuf> {
    write_snapshot_in(Path::new(SAVE_DIR), slot, snapshot)
}

pub fn read_snapshot(slot: &str) -> Result<String> {
    read_snapshot_in(Path::new(SAVE_DIR), slot)
}

pub fn list_slots() -> Vec<String> {
    let slots = list_slots_in(Path::new(SAVE_DIR));
    if slots.is_empty() {
        warn!("no save slots found under {SAVE_DIR}");
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sanitize_strips_awkward_characters() {
        assert_eq!(sanitize_slot("my save!"), "my_save_");
        assert_eq!(sanitize_slot("alpha-2"), "alpha-2");
        assert_eq!(sanitize_slot("   "), "quick");
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempdir().unwrap();
        let path = write_snapshot_in(dir.path(), "alpha", "{\"ok\":true}").unwrap();
        assert!(path.ends_with("thornvale-alpha.json"));
        let raw = read_snapshot_in(dir.path(), "alpha").unwrap();
        assert_eq!(raw, "{\"ok\":true}");
    }

    #[test]
    fn list_finds_only_save_files() {
        let dir = tempdir().unwrap();
        write_snapshot_in(dir.path(), "beta", "{}").unwrap();
        write_snapshot_in(dir.path(), "alpha", "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let slots = list_slots_in(dir.path());
        assert_eq!(slots, vec!["alpha".to_string(), "beta".to_string()]);
    }

    #[test]
    fn missing_directory_lists_nothing() {
        let dir = tempdir().unwrap();
        let slots = list_slots_in(&dir.path().join("nope"));
        assert!(slots.is_empty());
    }
}

//! Engine configuration.
//!
//! A small TOML file (`thornvale.toml`) can override where the world
//! tables live and which location/quest the game opens with. A missing or
//! malformed file falls back to defaults with a warning, in keeping with
//! the degraded-start rule: configuration problems never stop the game.

use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Directory holding the TSV world tables and intro text.
    pub data_dir: PathBuf,
    /// Location the player starts in.
    pub start_location: String,
    /// Quest auto-started at initialization; empty disables.
    pub main_quest: String,
    /// Display name for the player character.
    pub player_name: String,
    /// Character subtype routed to the flavor-text provider instead of
    /// scripted dialog.
    pub flavor_subtype: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("thornvale_engine/data"),
            start_location: "loc_1".to_string(),
            main_quest: "quest_4".to_string(),
            player_name: "Adventurer".to_string(),
            flavor_subtype: "seer".to_string(),
        }
    }
}

/// Load configuration from `path`, falling back to defaults.
pub fn load_config(path: &Path) -> GameConfig {
    match std::fs::read_to_string(path) {
        Ok(raw) => match toml::from_str::<GameConfig>(&raw) {
            Ok(config) => {
                info!("configuration loaded from {}", path.display());
                config
            },
            Err(err) => {
                warn!("malformed config {}: {err}; using defaults", path.display());
                GameConfig::default()
            },
        },
        Err(_) => {
            info!("no config at {}; using defaults", path.display());
            GameConfig::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config(Path::new("/nonexistent/thornvale.toml"));
        assert_eq!(config.start_location, "loc_1");
        assert_eq!(config.main_quest, "quest_4");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thornvale.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "start_location = \"loc_9\"").unwrap();

        let config = load_config(&path);
        assert_eq!(config.start_location, "loc_9");
        assert_eq!(config.flavor_subtype, "seer");
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thornvale.toml");
        std::fs::write(&path, "start_location = [broken").unwrap();
        let config = load_config(&path);
        assert_eq!(config.start_location, "loc_1");
    }
}

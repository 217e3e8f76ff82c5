use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Build number written into every savegame's `savebuild` field.
pub const DEFAULT_SAVEBUILD: i64 = 958;

/// Number of slots offered by the save/load picker.
pub const DEFAULT_SLOT_COUNT: u32 = 9;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Directory holding `Savegame<n>.save` files and their screenshots.
    pub save_dir:            PathBuf,
    pub slot_count:          u32,
    pub savebuild:           i64,
    /// Capture `Savegame<n>.png` before writing a slot.
    pub capture_screenshots: bool,
    pub auto_save:           bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            save_dir:            PathBuf::from("."),
            slot_count:          DEFAULT_SLOT_COUNT,
            savebuild:           DEFAULT_SAVEBUILD,
            capture_screenshots: true,
            auto_save:           true,
        }
    }
}

impl PersistenceConfig {
    /// Load `persistence.json` from the data/ directory.
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/persistence.json");
        if !std::path::Path::new(&path).exists() {
            log::debug!("{path} not found, using default persistence config");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: PersistenceConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(config)
    }

    /// Config rooted at `save_dir` with screenshots disabled, for tests.
    pub fn default_test(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir:            save_dir.into(),
            capture_screenshots: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let config: PersistenceConfig =
            serde_json::from_str(r#"{ "slot_count": 3 }"#).expect("parse");
        assert_eq!(config.slot_count, 3);
        assert_eq!(config.savebuild, DEFAULT_SAVEBUILD);
        assert!(config.auto_save);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = PersistenceConfig::load("/nonexistent/data/dir").expect("defaults");
        assert_eq!(config.slot_count, DEFAULT_SLOT_COUNT);
    }
}

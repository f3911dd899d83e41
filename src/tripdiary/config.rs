use crate::error::{Result, TripDiaryError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";

/// Configuration for tripdiary, stored in the data directory as config.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TripDiaryConfig {
    /// Directory export files are written to. Defaults to the current
    /// working directory when unset.
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
}

impl TripDiaryConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(TripDiaryError::Io)?;
        let config: TripDiaryConfig =
            serde_json::from_str(&content).map_err(TripDiaryError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(TripDiaryError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(TripDiaryError::Serialization)?;
        fs::write(config_path, content).map_err(TripDiaryError::Io)?;
        Ok(())
    }

    /// Where export files land: the configured directory, else `fallback`.
    pub fn export_dir_or(&self, fallback: &Path) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| fallback.to_path_buf())
    }
}

use crate::error::Result;
use crate::import_export::TimestampFormat;
use crate::places::ROOT_ID;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings for one extraction run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Firefox profile directory; the detected default profile when unset
    #[serde(default)]
    pub profile_path: Option<PathBuf>,

    /// Remote endpoint for a future sync source/sink
    #[serde(default)]
    pub sync_url: Option<String>,

    /// Destination of the exported file
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Folder whose subtree is exported
    #[serde(default = "default_root_id")]
    pub root_id: i64,

    #[serde(default)]
    pub timestamps: TimestampFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile_path: None,
            sync_url: None,
            output_path: default_output_path(),
            root_id: default_root_id(),
            timestamps: TimestampFormat::default(),
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from("bookmarks.html")
}

fn default_root_id() -> i64 {
    ROOT_ID
}

impl Config {
    /// Load configuration from a file path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from default location (~/.config/placesync/config.yml)
    /// Falls back to default config if file doesn't exist
    pub fn load() -> Self {
        let config_path = crate::utils::get_config_dir().join("config.yml");

        if config_path.exists() {
            match Self::load_from_path(&config_path) {
                Ok(config) => config,
                Err(e) => {
                    warn!(
                        "Failed to load config from {:?}: {}; using defaults",
                        config_path, e
                    );
                    Self::default()
                }
            }
        } else {
            Self::default()
        }
    }

    /// Save configuration to a file path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;
        Ok(())
    }
}

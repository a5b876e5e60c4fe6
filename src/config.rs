use std::fs::{self, File};
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::StatsError;
use crate::regions::MatchPolicy;

const CONFIG_DIR_NAME: &str = "f1stats";
const CONFIG_FILE_NAME: &str = "config.json";

pub const DEFAULT_DATA_DIR: &str = "assets/data";
pub const DEFAULT_SEASON: i32 = 2024;
pub const MAX_SELECTED_CONSTRUCTORS: usize = 5;
pub const MAX_SELECTED_DRIVERS: usize = 6;
pub const TOP_CHAMPIONS: usize = 10;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub default_season: i32,
    pub max_selected_constructors: usize,
    pub max_selected_drivers: usize,
    pub top_champions: usize,
    pub region_match: MatchPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            default_season: DEFAULT_SEASON,
            max_selected_constructors: MAX_SELECTED_CONSTRUCTORS,
            max_selected_drivers: MAX_SELECTED_DRIVERS,
            top_champions: TOP_CHAMPIONS,
            region_match: MatchPolicy::FirstMatch,
        }
    }
}

impl AppConfig {
    pub fn default_path() -> Result<PathBuf, StatsError> {
        Ok(dirs::config_dir()
            .ok_or(StatsError::NoConfigDir)?
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    }

    /// Config from the user config directory, `None` when no file was saved yet
    pub fn from_local_file() -> Result<Option<Self>, StatsError> {
        Self::from_file(&Self::default_path()?)
    }

    pub fn from_file(path: &Path) -> Result<Option<Self>, StatsError> {
        if !path.exists() {
            debug!("No config file at {:?}", path);
            return Ok(None);
        }
        let file = File::open(path).map_err(|e| StatsError::ConfigIOError { source: e })?;
        let config =
            serde_json::from_reader(file).map_err(|e| StatsError::ConfigSerializeError { source: e })?;
        Ok(Some(config))
    }

    /// Saved config, or the defaults when there is none
    pub fn load_or_default() -> Result<Self, StatsError> {
        Ok(Self::from_local_file()?.unwrap_or_default())
    }

    pub fn save(&self) -> Result<(), StatsError> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), StatsError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| StatsError::ConfigIOError { source: e })?;
            }
        }

        let file = File::create(path).map_err(|e| StatsError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| StatsError::ConfigSerializeError { source: e })
    }
}

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::histogram::BinScale;
use crate::session::{SessionConfig, DEFAULT_SECS};
use crate::word_bank::DEFAULT_WORD_COUNT;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub number_of_words: usize,
    pub number_of_secs: u32,
    pub dataset_path: Option<PathBuf>,
    pub bin_scale: BinScale,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            number_of_words: DEFAULT_WORD_COUNT,
            number_of_secs: DEFAULT_SECS,
            dataset_path: None,
            bin_scale: BinScale::Count,
        }
    }
}

impl Config {
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            number_of_words: self.number_of_words.max(1),
            number_of_secs: self.number_of_secs.max(1),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(err) => tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "ignoring unreadable config"
                ),
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

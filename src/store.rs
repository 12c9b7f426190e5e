use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::session::Completion;

/// The most recent result, kept across runs for display only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastResult {
    #[serde(rename = "last_wpm")]
    pub wpm: u32,
    pub accuracy: u32,
    pub recorded_at: DateTime<Local>,
}

impl LastResult {
    pub fn now(completion: Completion) -> Self {
        Self {
            wpm: completion.wpm,
            accuracy: completion.accuracy,
            recorded_at: Local::now(),
        }
    }
}

pub trait ResultStore {
    fn load(&self) -> Option<LastResult>;
    fn save(&self, result: &LastResult) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileResultStore {
    path: PathBuf,
}

impl FileResultStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::last_result_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl ResultStore for FileResultStore {
    fn load(&self) -> Option<LastResult> {
        let bytes = fs::read(&self.path).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    fn save(&self, result: &LastResult) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(result)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_then_load() {
        let dir = tempdir().unwrap();
        let store = FileResultStore::with_path(dir.path().join("state").join("last.json"));
        let result = LastResult::now(Completion {
            wpm: 61,
            accuracy: 97,
        });

        store.save(&result).unwrap();

        assert_eq!(store.load(), Some(result));
    }

    #[test]
    fn wpm_is_stored_under_fixed_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("last.json");
        let store = FileResultStore::with_path(&path);
        store
            .save(&LastResult::now(Completion {
                wpm: 33,
                accuracy: 80,
            }))
            .unwrap();

        let raw: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["last_wpm"], 33);
    }

    #[test]
    fn missing_or_corrupt_file_loads_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("last.json");
        let store = FileResultStore::with_path(&path);
        assert_eq!(store.load(), None);

        fs::write(&path, b"[]").unwrap();
        assert_eq!(store.load(), None);
    }
}

use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "typeprobe";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    pub fn config_path() -> PathBuf {
        Self::project()
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("typeprobe_config.json"))
    }

    /// Where the latest result is cached between runs
    pub fn last_result_path() -> PathBuf {
        Self::state_dir()
            .map(|dir| dir.join("last_result.json"))
            .unwrap_or_else(|| PathBuf::from("typeprobe_last_result.json"))
    }

    pub fn log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("typeprobe.log"))
    }

    fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join(APP_NAME))
        } else {
            Self::project().map(|pd| pd.data_local_dir().to_path_buf())
        }
    }
}

use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Where the score history lives: $HOME/.local/state/quickbench, else the platform data dir
    pub fn data_dir() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("quickbench")
        } else if let Some(proj_dirs) = ProjectDirs::from("", "", "quickbench") {
            proj_dirs.data_local_dir().to_path_buf()
        } else {
            PathBuf::from(".quickbench")
        }
    }

    pub fn config_path() -> PathBuf {
        if let Some(pd) = ProjectDirs::from("", "", "quickbench") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("quickbench_config.json")
        }
    }
}

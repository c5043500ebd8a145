use crate::core::error::GitShepherdError;
use std::path::PathBuf;

pub fn get_config_directory() -> Result<PathBuf, GitShepherdError> {
    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::home_dir().unwrap_or_default().join(".config")),
        "macos" => dirs::home_dir()
            .unwrap_or_default()
            .join("Library/Application Support"),
        "windows" => dirs::config_dir().unwrap_or_default(),
        _ => dirs::config_dir().unwrap_or_default(),
    };

    if base.as_os_str().is_empty() {
        return Err(GitShepherdError::ConfigDirectoryNotFound);
    }

    Ok(base.join("git-shepherd"))
}

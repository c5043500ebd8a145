//! Configuration structures and persistence.
//!
//! Per-repository settings plus the global git binary path, persisted as
//! pretty-printed JSON under the platform config directory. The sync core
//! receives these as read-only snapshots; only the CLI mutates them.

use crate::core::dirs::get_config_directory;
use crate::core::error::{GitShepherdError, Result};
use crate::core::git::GitRunner;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

fn default_remote() -> String {
    "origin".to_string()
}

fn default_main_branch() -> String {
    "main".to_string()
}

fn default_branch_prefix() -> String {
    "claude/".to_string()
}

fn default_poll_interval() -> u64 {
    60
}

fn default_git_binary() -> String {
    "git".to_string()
}

/// Settings for one monitored repository.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    pub path: PathBuf,
    #[serde(default = "default_remote")]
    pub remote: String,
    #[serde(default = "default_main_branch")]
    pub main_branch: String,
    #[serde(default = "default_branch_prefix")]
    pub branch_prefix: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
}

impl RepositoryConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            remote: default_remote(),
            main_branch: default_main_branch(),
            branch_prefix: default_branch_prefix(),
            poll_interval_seconds: default_poll_interval(),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds.max(1))
    }

    /// The remote tracking ref of main, e.g. `origin/main`.
    pub fn remote_main(&self) -> String {
        format!("{}/{}", self.remote, self.main_branch)
    }

    /// Fill in remote and main branch by inspecting the repository.
    ///
    /// Picks the first configured remote, then resolves its HEAD symbolic
    /// ref; falls back to probing for `main` and `master`.
    pub fn detect_settings(&mut self, runner: &GitRunner) -> Result<()> {
        let remotes = runner.remotes()?;
        if let Some(first) = remotes.first() {
            self.remote = first.clone();
        }

        let head_ref = format!("refs/remotes/{}/HEAD", self.remote);
        if let Ok(target) = runner.symbolic_ref(&head_ref) {
            if let Some(name) = target.rsplit('/').next() {
                if !name.is_empty() {
                    self.main_branch = name.to_string();
                    return Ok(());
                }
            }
        }

        for candidate in ["main", "master"] {
            let refname = format!("refs/remotes/{}/{candidate}", self.remote);
            if runner.ref_exists(&refname)? {
                self.main_branch = candidate.to_string();
                return Ok(());
            }
        }

        Ok(())
    }
}

/// The whole config file: global settings plus the repository list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GlobalConfig {
    #[serde(default = "default_git_binary")]
    pub git_binary: String,
    #[serde(default)]
    pub repositories: Vec<RepositoryConfig>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            git_binary: default_git_binary(),
            repositories: Vec::new(),
        }
    }
}

impl GlobalConfig {
    pub fn load_or_create() -> Result<Self> {
        let config_file = Self::config_file_path()?;
        Self::load_or_create_at(&config_file)
    }

    pub fn save(&self) -> Result<()> {
        let config_file = Self::config_file_path()?;
        self.save_at(&config_file)
    }

    pub fn config_file_path() -> Result<PathBuf> {
        Ok(get_config_directory()?.join("config.json"))
    }

    /// Path-parameterized variant so tests can use a temp directory.
    pub fn load_or_create_at(config_file: &Path) -> Result<Self> {
        if config_file.exists() {
            let content = std::fs::read_to_string(config_file)?;
            Ok(serde_json::from_str(&content)?)
        } else {
            let config = Self::default();
            config.save_at(config_file)?;
            Ok(config)
        }
    }

    pub fn save_at(&self, config_file: &Path) -> Result<()> {
        if let Some(parent) = config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_file, content)?;
        Ok(())
    }

    pub fn repository(&self, path: &Path) -> Result<&RepositoryConfig> {
        self.repositories
            .iter()
            .find(|r| r.path == path)
            .ok_or_else(|| GitShepherdError::RepositoryNotConfigured {
                path: path.to_path_buf(),
            })
    }

    /// Add a repository, replacing any existing entry for the same path.
    pub fn add_repository(&mut self, repo: RepositoryConfig) {
        self.repositories.retain(|r| r.path != repo.path);
        self.repositories.push(repo);
    }

    /// Remove a repository by path. Returns whether an entry existed.
    pub fn remove_repository(&mut self, path: &Path) -> bool {
        let before = self.repositories.len();
        self.repositories.retain(|r| r.path != path);
        self.repositories.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let repo = RepositoryConfig::new("/tmp/repo");
        assert_eq!(repo.remote, "origin");
        assert_eq!(repo.main_branch, "main");
        assert_eq!(repo.branch_prefix, "claude/");
        assert_eq!(repo.poll_interval_seconds, 60);
        assert_eq!(repo.remote_main(), "origin/main");
    }

    #[test]
    fn test_poll_interval_floor() {
        let mut repo = RepositoryConfig::new("/tmp/repo");
        repo.poll_interval_seconds = 0;
        assert_eq!(repo.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_round_trip() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("config.json");

        let mut config = GlobalConfig::default();
        config.add_repository(RepositoryConfig::new("/tmp/repo-a"));
        config.save_at(&file).unwrap();

        let loaded = GlobalConfig::load_or_create_at(&file).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_or_create_creates_default() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("nested").join("config.json");

        let config = GlobalConfig::load_or_create_at(&file).unwrap();
        assert_eq!(config, GlobalConfig::default());
        assert!(file.exists());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("config.json");
        std::fs::write(
            &file,
            r#"{"repositories": [{"path": "/tmp/repo-a", "poll_interval_seconds": 15}]}"#,
        )
        .unwrap();

        let config = GlobalConfig::load_or_create_at(&file).unwrap();
        assert_eq!(config.git_binary, "git");
        assert_eq!(config.repositories[0].remote, "origin");
        assert_eq!(config.repositories[0].poll_interval_seconds, 15);
    }

    #[test]
    fn test_add_repository_replaces_same_path() {
        let mut config = GlobalConfig::default();
        config.add_repository(RepositoryConfig::new("/tmp/repo-a"));

        let mut edited = RepositoryConfig::new("/tmp/repo-a");
        edited.poll_interval_seconds = 10;
        config.add_repository(edited);

        assert_eq!(config.repositories.len(), 1);
        assert_eq!(config.repositories[0].poll_interval_seconds, 10);
    }

    #[test]
    fn test_remove_repository() {
        let mut config = GlobalConfig::default();
        config.add_repository(RepositoryConfig::new("/tmp/repo-a"));
        assert!(config.remove_repository(Path::new("/tmp/repo-a")));
        assert!(!config.remove_repository(Path::new("/tmp/repo-a")));
        assert!(config.repository(Path::new("/tmp/repo-a")).is_err());
    }
}

//! Domain-specific error types and error handling utilities.
//!
//! This module defines [`GitShepherdError`] which provides comprehensive error handling
//! for all git-shepherd operations. It uses `thiserror` for ergonomic error definitions
//! and distinguishes the three failure classes the sync cycle cares about.
//!
//! # Public API
//! - [`GitShepherdError`]: Main error enum covering all failure modes
//! - [`Result<T>`]: Type alias for `std::result::Result<T, GitShepherdError>`
//!
//! # Error Categories
//! - **Collector errors**: Repository not found, bad remote, failed git queries;
//!   these halt polling for the affected repository
//! - **Executor race**: State changed between decide and execute; swallowed and
//!   re-evaluated on the next cycle
//! - **Executor fatal**: Merge conflicts, hard push rejections; surfaced to the
//!   observer while polling continues
//! - **Configuration**: Config directory/file problems, unknown repositories

use std::path::PathBuf;
use thiserror::Error;

/// Domain-specific error types for git-shepherd
#[derive(Error, Debug)]
pub enum GitShepherdError {
    // Collector errors
    #[error("Not a git repository: {path}")]
    NotAGitRepo { path: PathBuf },

    #[error("Remote '{remote}' not found in repository")]
    RemoteNotFound { remote: String },

    #[error("git {context} failed: {stderr}")]
    GitCommand { context: String, stderr: String },

    #[error("git binary not found: {binary}")]
    GitBinaryNotFound { binary: String },

    // Executor errors
    #[error("stale decision, repository state changed: {0}")]
    ExecutorRace(String),

    #[error("{0}")]
    ExecutorFatal(String),

    // Configuration errors
    #[error("Repository is not configured: {path}")]
    RepositoryNotConfigured { path: PathBuf },

    #[error("Could not find config directory")]
    ConfigDirectoryNotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results using GitShepherdError
pub type Result<T> = std::result::Result<T, GitShepherdError>;

impl GitShepherdError {
    /// Create a git command failure error
    pub fn git_command(context: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::GitCommand {
            context: context.into(),
            stderr: stderr.into(),
        }
    }

    /// Create a not-a-git-repository error
    pub fn not_a_git_repo(path: impl Into<PathBuf>) -> Self {
        Self::NotAGitRepo { path: path.into() }
    }

    /// Create a remote-not-found error
    pub fn remote_not_found(remote: impl Into<String>) -> Self {
        Self::RemoteNotFound {
            remote: remote.into(),
        }
    }

    /// Classify a rejected push or fast-forward as a race or a fatal failure.
    ///
    /// A concurrent remote update shows up as a non-fast-forward rejection and
    /// self-corrects on the next cycle. Anything else (conflicts, permissions,
    /// missing refs) needs the user.
    pub fn classify_push_failure(context: impl Into<String>, stderr: impl Into<String>) -> Self {
        let context = context.into();
        let stderr = stderr.into();
        let lowered = stderr.to_lowercase();
        if lowered.contains("non-fast-forward")
            || lowered.contains("fetch first")
            || lowered.contains("fast-forward")
        {
            Self::ExecutorRace(format!("{context}: {stderr}"))
        } else {
            Self::ExecutorFatal(format!("{context}: {stderr}"))
        }
    }

    /// Whether this error is a stale-decision race the scheduler may swallow.
    pub fn is_race(&self) -> bool {
        matches!(self, Self::ExecutorRace(_))
    }
}

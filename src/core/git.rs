//! Git command facility.
//!
//! This module provides [`GitRunner`], the single point through which git-shepherd
//! talks to a repository. Every operation shells out to the configured git binary
//! and reports failures as [`GitShepherdError::GitCommand`] carrying the raw
//! stderr text, so diagnostics reach the observer unmodified.
//!
//! # Public API
//! - [`GitRunner`]: Runs git subcommands in one repository's working directory
//!
//! # Key Features
//! - **Configurable binary**: Honors the `git_binary` global setting
//! - **Raw diagnostics**: Non-zero exits surface trimmed stderr verbatim
//! - **Query helpers**: Ref existence, ahead/behind counts, merge-base diffs
//! - **Mutation helpers**: Fetch, push, fast-forward merge, merge commits

use crate::core::error::{GitShepherdError, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Runs git subcommands against a single repository.
#[derive(Debug, Clone)]
pub struct GitRunner {
    binary: String,
    repo_path: PathBuf,
}

impl GitRunner {
    pub fn new(binary: impl Into<String>, repo_path: impl Into<PathBuf>) -> Self {
        GitRunner {
            binary: binary.into(),
            repo_path: repo_path.into(),
        }
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// Run a git subcommand, returning trimmed stdout on success.
    ///
    /// A non-zero exit status becomes a `GitCommand` error carrying the
    /// subcommand and trimmed stderr.
    pub fn run(&self, args: &[&str]) -> Result<String> {
        let context = args.join(" ");
        log::debug!("git {} (in {})", context, self.repo_path.display());

        let output = Command::new(&self.binary)
            .args(args)
            .current_dir(&self.repo_path)
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => GitShepherdError::GitBinaryNotFound {
                    binary: self.binary.clone(),
                },
                _ => GitShepherdError::Io(e),
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(GitShepherdError::git_command(context, stderr))
        }
    }

    /// Run a git subcommand where a non-zero exit is an expected answer,
    /// not a failure. Errors only if the binary cannot be spawned.
    pub fn probe(&self, args: &[&str]) -> Result<bool> {
        let output = Command::new(&self.binary)
            .args(args)
            .current_dir(&self.repo_path)
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => GitShepherdError::GitBinaryNotFound {
                    binary: self.binary.clone(),
                },
                _ => GitShepherdError::Io(e),
            })?;
        Ok(output.status.success())
    }

    // === Queries ===

    /// Whether the repository (or a parent) has a git directory.
    pub fn is_git_repo(&self) -> Result<bool> {
        self.probe(&["rev-parse", "--git-dir"])
    }

    /// Whether a ref resolves to a commit.
    pub fn ref_exists(&self, refname: &str) -> Result<bool> {
        self.probe(&["rev-parse", "--verify", "--quiet", refname])
    }

    /// Names of the configured remotes.
    pub fn remotes(&self) -> Result<Vec<String>> {
        let out = self.run(&["remote"])?;
        Ok(out.lines().map(str::to_string).collect())
    }

    /// Short names of remote branches under `refs/remotes/<remote>/<prefix>`,
    /// with the `<remote>/` part stripped.
    pub fn tracked_branches(&self, remote: &str, prefix: &str) -> Result<Vec<String>> {
        let pattern = format!("refs/remotes/{remote}/{prefix}*");
        let out = self.run(&["for-each-ref", "--format=%(refname:short)", &pattern])?;
        let strip = format!("{remote}/");
        Ok(out
            .lines()
            .filter_map(|l| l.strip_prefix(&strip))
            .map(str::to_string)
            .collect())
    }

    /// Number of commits reachable from `tip` but not from `base`.
    pub fn commits_ahead(&self, base: &str, tip: &str) -> Result<usize> {
        let range = format!("{base}..{tip}");
        let out = self.run(&["rev-list", "--count", &range])?;
        out.parse().map_err(|_| {
            GitShepherdError::git_command(
                format!("rev-list --count {range}"),
                format!("unexpected count output: {out}"),
            )
        })
    }

    /// Files touched by commits unique to `tip` relative to the merge base
    /// with `base` (three-dot diff).
    pub fn changed_files(&self, base: &str, tip: &str) -> Result<BTreeSet<String>> {
        let range = format!("{base}...{tip}");
        let out = self.run(&["diff", "--name-only", &range])?;
        Ok(out
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    // === Mutations ===

    /// Fetch a remote. The only network read the collector performs.
    pub fn fetch(&self, remote: &str) -> Result<()> {
        self.run(&["fetch", remote]).map(|_| ())
    }

    /// Push a ref or refspec. Never forces.
    pub fn push(&self, remote: &str, refspec: &str) -> Result<()> {
        self.run(&["push", remote, refspec]).map(|_| ())
    }

    /// Fast-forward the current branch to `target`; refuses to create a
    /// merge commit.
    pub fn merge_ff_only(&self, target: &str) -> Result<()> {
        self.run(&["merge", "--ff-only", target]).map(|_| ())
    }

    /// Create a real merge commit from `target`.
    pub fn merge_commit(&self, target: &str, message: &str) -> Result<()> {
        self.run(&["merge", target, "-m", message]).map(|_| ())
    }

    /// Abort an in-progress merge. Best effort, used after a conflict.
    pub fn merge_abort(&self) {
        if let Err(e) = self.run(&["merge", "--abort"]) {
            log::warn!("merge --abort failed: {e}");
        }
    }

    /// Resolve a symbolic ref (used for main-branch auto-detection).
    pub fn symbolic_ref(&self, name: &str) -> Result<String> {
        self.run(&["symbolic-ref", name])
    }
}

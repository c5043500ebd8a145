//! State collector: turns one repository into a [`RepoSnapshot`].
//!
//! Read-only apart from the fetch. The fetch comes first so every count and
//! diff below reflects current remote state rather than stale local refs.
//! Any failed query aborts collection with the underlying git diagnostic;
//! the scheduler converts that into a `Decision::GitError` for observers.

use crate::core::config::RepositoryConfig;
use crate::core::error::{GitShepherdError, Result};
use crate::core::git::GitRunner;
use crate::core::state::{BranchStatus, MainStatus, RepoSnapshot};
use std::collections::BTreeSet;

/// Preflight: the path is a repository and the configured remote exists.
///
/// Run before the first cycle and after config edits, so a misconfigured
/// repository fails with a precise message instead of a raw fetch error.
pub fn check_health(runner: &GitRunner, config: &RepositoryConfig) -> Result<()> {
    if !runner.repo_path().is_dir() || !runner.is_git_repo()? {
        return Err(GitShepherdError::not_a_git_repo(runner.repo_path()));
    }

    let remotes = runner.remotes()?;
    if !remotes.iter().any(|r| r == &config.remote) {
        return Err(GitShepherdError::remote_not_found(&config.remote));
    }

    Ok(())
}

/// Collect branch-state facts for one poll cycle.
pub fn collect(runner: &GitRunner, config: &RepositoryConfig) -> Result<RepoSnapshot> {
    runner.fetch(&config.remote)?;

    let remote_main = config.remote_main();
    let remote_main_ref = format!("refs/remotes/{remote_main}");
    let exists = runner.ref_exists(&remote_main_ref)?;

    if !exists {
        // The engine turns this into a GitError decision; there is nothing
        // meaningful to compare branches against.
        return Ok(RepoSnapshot {
            main: MainStatus {
                local_ahead_of_remote: 0,
                exists: false,
            },
            branches: Vec::new(),
        });
    }

    let local_main_ref = format!("refs/heads/{}", config.main_branch);
    let local_ahead_of_remote = if runner.ref_exists(&local_main_ref)? {
        runner.commits_ahead(&remote_main, &config.main_branch)?
    } else {
        0
    };

    let mut names = runner.tracked_branches(&config.remote, &config.branch_prefix)?;
    names.sort();

    let mut branches = Vec::with_capacity(names.len());
    for name in names {
        let tip = format!("{}/{name}", config.remote);
        let ahead_of_main = runner.commits_ahead(&remote_main, &tip)?;
        let behind_main = runner.commits_ahead(&tip, &remote_main)?;

        // No unique commits means no files to report; skip the diff.
        let changed_files = if ahead_of_main > 0 {
            runner.changed_files(&remote_main, &tip)?
        } else {
            BTreeSet::new()
        };

        branches.push(BranchStatus {
            name,
            ahead_of_main,
            behind_main,
            changed_files,
        });
    }

    Ok(RepoSnapshot {
        main: MainStatus {
            local_ahead_of_remote,
            exists: true,
        },
        branches,
    })
}

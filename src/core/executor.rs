//! Action executor: turns an authorizing [`Decision`] into git mutations.
//!
//! Observe-only decisions (`Idle`, `MergeCandidate`, `Stop`, `GitError`) are
//! no-ops here. Merge candidates are only ever acted on through the separate
//! [`merge_branches`] entry point, which the observer layer invokes on an
//! explicit user request.
//!
//! Failure classes matter more than failures: a rejected push caused by a
//! concurrent remote update is a race (the next cycle re-derives the right
//! decision from fresh state), while a merge conflict or hard rejection is
//! fatal and surfaced verbatim.

use crate::core::config::RepositoryConfig;
use crate::core::engine::Decision;
use crate::core::error::{GitShepherdError, Result};
use crate::core::git::GitRunner;

/// What the executor actually did for one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionReport {
    /// Observe-only decision; nothing was touched.
    Observed,
    PushedMain {
        commits: usize,
    },
    /// Behind-only branches advanced to main. Rejected branches are skipped,
    /// not failed: a concurrent push there self-corrects next cycle.
    SyncedBehind {
        synced: Vec<String>,
        skipped: Vec<String>,
    },
    FastForwarded {
        branch: String,
        propagated_to: Vec<String>,
    },
    Merged {
        branches: Vec<String>,
    },
}

/// Execute the automatic action a decision authorizes.
pub fn execute(
    runner: &GitRunner,
    config: &RepositoryConfig,
    decision: &Decision,
) -> Result<ExecutionReport> {
    match decision {
        Decision::AutoPushMain { commits } => {
            push_classified(runner, config, &config.main_branch)?;
            log::info!("pushed {} local commits on {}", commits, config.main_branch);
            Ok(ExecutionReport::PushedMain { commits: *commits })
        }

        Decision::AutoSyncBehind(branches) => {
            let mut synced = Vec::new();
            let mut skipped = Vec::new();
            for branch in branches {
                // Source the freshly fetched remote state, not local main,
                // which nothing guarantees is current.
                let refspec = format!(
                    "refs/remotes/{}:refs/heads/{branch}",
                    config.remote_main()
                );
                match push_classified(runner, config, &refspec) {
                    Ok(()) => synced.push(branch.clone()),
                    // A single rejected branch must not fail the batch.
                    Err(e) if matches!(e, GitShepherdError::ExecutorRace(_) | GitShepherdError::ExecutorFatal(_)) => {
                        log::warn!("skipping {branch}: {e}");
                        skipped.push(branch.clone());
                    }
                    Err(e) => return Err(e),
                }
            }
            Ok(ExecutionReport::SyncedBehind { synced, skipped })
        }

        Decision::FastForwardAndPush(branch) => {
            prepare_local_main(runner, config)?;
            let target = format!("{}/{branch}", config.remote);
            runner.merge_ff_only(&target).map_err(|e| {
                // Not fast-forwardable anymore: the state changed between
                // decide and execute.
                GitShepherdError::ExecutorRace(e.to_string())
            })?;
            let propagated_to = push_main_and_propagate(runner, config)?;
            Ok(ExecutionReport::FastForwarded {
                branch: branch.clone(),
                propagated_to,
            })
        }

        Decision::Idle
        | Decision::MergeCandidate(_)
        | Decision::Stop { .. }
        | Decision::GitError(_) => Ok(ExecutionReport::Observed),
    }
}

/// Manual merge of offered candidates. Never called automatically.
///
/// Creates a real merge commit per branch; the first conflict aborts the
/// merge, leaves the working tree clean, and reports a fatal error.
pub fn merge_branches(
    runner: &GitRunner,
    config: &RepositoryConfig,
    branches: &[String],
) -> Result<ExecutionReport> {
    prepare_local_main(runner, config)?;

    for branch in branches {
        let target = format!("{}/{branch}", config.remote);
        let message = format!("Merge {branch}");
        if let Err(e) = runner.merge_commit(&target, &message) {
            runner.merge_abort();
            return Err(GitShepherdError::ExecutorFatal(format!(
                "merge of {branch} failed: {e}"
            )));
        }
        log::info!("merged {branch} into {}", config.main_branch);
    }

    push_main_and_propagate(runner, config)?;
    Ok(ExecutionReport::Merged {
        branches: branches.to_vec(),
    })
}

/// Merging into main only makes sense from main's working tree, and local
/// main must match the fetched remote state before anything lands on it.
fn prepare_local_main(runner: &GitRunner, config: &RepositoryConfig) -> Result<()> {
    let head = runner.symbolic_ref("HEAD")?;
    let expected = format!("refs/heads/{}", config.main_branch);
    if head != expected {
        return Err(GitShepherdError::ExecutorRace(format!(
            "repository is on {head}, not {expected}"
        )));
    }

    // No-op when already current; refuses (as a race) if local main somehow
    // diverged from the remote since the decision was made.
    runner
        .merge_ff_only(&config.remote_main())
        .map_err(|e| GitShepherdError::ExecutorRace(e.to_string()))
}

/// Push main, then advance every tracked branch to main's new tip.
///
/// Returns the branches that were propagated to. A rejected propagation is
/// fatal, matching the conservative stop-on-push-failure behavior.
fn push_main_and_propagate(
    runner: &GitRunner,
    config: &RepositoryConfig,
) -> Result<Vec<String>> {
    push_classified(runner, config, &config.main_branch)?;

    let mut branches = runner.tracked_branches(&config.remote, &config.branch_prefix)?;
    branches.sort();

    for branch in &branches {
        let refspec = format!("{}:{branch}", config.main_branch);
        push_classified(runner, config, &refspec)?;
    }

    Ok(branches)
}

fn push_classified(runner: &GitRunner, config: &RepositoryConfig, refspec: &str) -> Result<()> {
    runner.push(&config.remote, refspec).map_err(|e| match e {
        GitShepherdError::GitCommand { context, stderr } => {
            GitShepherdError::classify_push_failure(context, stderr)
        }
        other => other,
    })
}

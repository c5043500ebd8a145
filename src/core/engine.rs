//! The synchronization decision engine.
//!
//! This module classifies a repository snapshot into exactly one [`Decision`].
//! [`decide`] is a pure function: no I/O, no hidden state, same input gives
//! the same output. All judgment about what is safe to automate lives here,
//! in one place, in a fixed rule order.
//!
//! # Public API
//! - [`Decision`]: Closed set of outcomes, one active per poll cycle
//! - [`decide`]: `(MainStatus, [BranchStatus]) -> Decision`
//!
//! # Rule order (first match wins)
//! 1. Missing remote main is a repository error
//! 2. Keeping main pushed always takes priority over branch handling
//! 3. Behind-only branches are safe to fast-forward automatically
//! 4. A single ahead, non-diverged branch fast-forwards into main
//! 5. Anything diverged or multiple ahead branches: disjoint file sets
//!    offer a manual merge, overlapping file sets stop synchronization

use crate::core::state::{BranchStatus, MainStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The engine's sole output. Exactly one case is active per cycle; the
/// closed enum keeps every consumer exhaustive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// Nothing to do.
    Idle,
    /// Local main has unpushed commits and no tracked-branch conflict.
    AutoPushMain { commits: usize },
    /// Branches strictly behind main; safe to advance them automatically.
    AutoSyncBehind(Vec<String>),
    /// Exactly one branch ahead, not diverged: merge via fast-forward and push.
    FastForwardAndPush(String),
    /// Multiple or diverged branches with pairwise-disjoint file sets;
    /// a manual merge is offered.
    MergeCandidate(Vec<String>),
    /// Overlapping file sets: automatic and manual merge are refused.
    Stop {
        branches: Vec<String>,
        conflicting_files: BTreeSet<String>,
    },
    /// Repository state could not be read.
    GitError(String),
}

impl Decision {
    /// Stable name of the active variant, used for transition detection.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Decision::Idle => "Idle",
            Decision::AutoPushMain { .. } => "AutoPushMain",
            Decision::AutoSyncBehind(_) => "AutoSyncBehind",
            Decision::FastForwardAndPush(_) => "FastForwardAndPush",
            Decision::MergeCandidate(_) => "MergeCandidate",
            Decision::Stop { .. } => "Stop",
            Decision::GitError(_) => "GitError",
        }
    }

    /// Whether the executor is authorized to mutate repository state.
    pub fn authorizes_action(&self) -> bool {
        matches!(
            self,
            Decision::AutoPushMain { .. }
                | Decision::AutoSyncBehind(_)
                | Decision::FastForwardAndPush(_)
        )
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Idle => write!(f, "Idle — all branches synchronized"),
            Decision::AutoPushMain { commits } => {
                write!(f, "Local main ahead by {commits} — pushing")
            }
            Decision::AutoSyncBehind(branches) => {
                write!(f, "Branches behind main: {}", branches.join(", "))
            }
            Decision::FastForwardAndPush(branch) => {
                write!(f, "Fast-forwarding main to {branch}")
            }
            Decision::MergeCandidate(branches) => {
                write!(
                    f,
                    "STOP — merge possible (disjoint files): {}",
                    branches.join(", ")
                )
            }
            Decision::Stop {
                branches,
                conflicting_files,
            } => {
                write!(
                    f,
                    "STOP — human action required: {} (common files: {})",
                    branches.join(", "),
                    conflicting_files
                        .iter()
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
            Decision::GitError(message) => write!(f, "ERROR — {message}"),
        }
    }
}

/// Classify one repository snapshot. Deterministic and side-effect free.
pub fn decide(main: &MainStatus, branches: &[BranchStatus]) -> Decision {
    if !main.exists {
        return Decision::GitError("remote main branch does not exist".to_string());
    }

    let ahead: Vec<&BranchStatus> = branches.iter().filter(|b| b.ahead_of_main > 0).collect();
    let behind_only: Vec<&BranchStatus> = branches
        .iter()
        .filter(|b| b.ahead_of_main == 0 && b.behind_main > 0)
        .collect();

    if ahead.is_empty() && behind_only.is_empty() && main.local_ahead_of_remote == 0 {
        return Decision::Idle;
    }

    // Keeping main pushed is always safe and takes priority over branch rules.
    if main.local_ahead_of_remote > 0 {
        return Decision::AutoPushMain {
            commits: main.local_ahead_of_remote,
        };
    }

    if ahead.is_empty() {
        return Decision::AutoSyncBehind(behind_only.iter().map(|b| b.name.clone()).collect());
    }

    if ahead.len() == 1 && !ahead[0].is_diverged() {
        return Decision::FastForwardAndPush(ahead[0].name.clone());
    }

    // Any diverged branch, or two or more ahead branches. Disjointness is
    // pairwise over the whole set: one shared file anywhere refuses the lot.
    let mut conflicting: BTreeSet<String> = BTreeSet::new();
    for (i, a) in ahead.iter().enumerate() {
        for b in &ahead[i + 1..] {
            conflicting.extend(a.changed_files.intersection(&b.changed_files).cloned());
        }
    }

    let names: Vec<String> = ahead.iter().map(|b| b.name.clone()).collect();
    if conflicting.is_empty() {
        Decision::MergeCandidate(names)
    } else {
        Decision::Stop {
            branches: names,
            conflicting_files: conflicting,
        }
    }
}

//! Branch-state data structures shared by the collector and the engine.
//!
//! This module defines the facts one poll cycle gathers about a repository.
//! The collector fills these in; the decision engine consumes them without
//! touching the repository again.
//!
//! # Public API
//! - [`MainStatus`]: Local main vs. its remote tracking ref
//! - [`BranchStatus`]: One tracked branch's position relative to main
//! - [`RepoSnapshot`]: Everything the engine needs for one decision

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// State of the local main branch relative to its remote counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainStatus {
    /// Commits on local main that the remote does not have.
    pub local_ahead_of_remote: usize,
    /// Whether the remote main ref exists at all.
    pub exists: bool,
}

/// One tracked branch's position relative to remote main.
///
/// `changed_files` lists the paths touched by commits unique to this branch
/// (the merge-base diff), so a diverged branch reports only its own work.
/// A branch with no unique commits has an empty set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchStatus {
    pub name: String,
    pub ahead_of_main: usize,
    pub behind_main: usize,
    pub changed_files: BTreeSet<String>,
}

impl BranchStatus {
    /// Both ahead and behind: the branch and main have each moved on.
    pub fn is_diverged(&self) -> bool {
        self.ahead_of_main > 0 && self.behind_main > 0
    }

    /// Neither ahead nor behind: nothing left to synchronize.
    pub fn is_fully_merged(&self) -> bool {
        self.ahead_of_main == 0 && self.behind_main == 0
    }
}

/// Complete read-only snapshot of a repository for one poll cycle.
///
/// Branches are kept sorted by name so decisions are deterministic for a
/// given repository state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSnapshot {
    pub main: MainStatus,
    pub branches: Vec<BranchStatus>,
}

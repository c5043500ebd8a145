//! Core functionality for the git-shepherd tool.
//!
//! This module provides the synchronization decision engine and everything
//! around it: the state collector, the action executor, the per-repository
//! scheduler, configuration, and error handling.

pub mod collector;
pub mod config;
pub mod dirs;
pub mod engine;
pub mod error;
pub mod executor;
pub mod git;
pub mod output;
pub mod scheduler;
pub mod state;

// === Error handling ===
// Core error types and result type used throughout the application
pub use error::{GitShepherdError, Result};

// === Git command facility ===
// Subprocess interface to the configured git binary
pub use git::GitRunner;

// === Branch-state data model ===
pub use state::{BranchStatus, MainStatus, RepoSnapshot};

// === Decision engine ===
// The pure classification function and its closed output type
pub use engine::{decide, Decision};

// === Collector / Executor ===
pub use collector::{check_health, collect};
pub use executor::{execute, merge_branches, ExecutionReport};

// === Scheduler ===
// Per-repository polling workers and the observer event channel
pub use scheduler::{observe_once, sync_once, Herd, RepoEvent, RepoId};

// === Configuration ===
pub use config::{GlobalConfig, RepositoryConfig};

// === Output formatting ===
pub use output::{format_decision, print_error, print_info, print_section_header, print_success};

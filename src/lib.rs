//! Git Shepherd - a deterministic multi-repository branch synchronization monitor.
//!
//! This library provides the core functionality for git-shepherd: collecting
//! branch-state facts from repositories, classifying them into synchronization
//! decisions, executing the safe ones, and scheduling independent poll cycles
//! per repository.
//!
//! # Public API
//! The main public interface is re-exported from the [`core`] module, which provides:
//! - The pure decision engine and its closed `Decision` type
//! - The read-only state collector and the action executor
//! - Per-repository polling workers with an observer event channel
//! - Configuration loading and error handling

pub mod commands;
pub mod core;

// Re-export the core public API for external users
pub use core::{
    check_health,
    collect,
    decide,
    execute,
    format_decision,

    merge_branches,
    observe_once,

    print_error,
    print_info,
    print_section_header,
    print_success,
    sync_once,

    BranchStatus,
    Decision,
    ExecutionReport,
    // Error handling
    GitShepherdError,
    // Git command facility
    GitRunner,
    GlobalConfig,
    Herd,
    MainStatus,
    RepoEvent,
    RepoId,
    RepoSnapshot,
    RepositoryConfig,
    Result,
};

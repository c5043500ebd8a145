//! CLI command entry points.
//!
//! Thin glue over the core: each command loads configuration, drives the
//! collector/engine/executor or the scheduler, and renders the outcome.

pub mod merge;
pub mod repos;
pub mod status;
pub mod sync;
pub mod watch;

pub use merge::execute_merge;
pub use repos::{execute_repos_add, execute_repos_list, execute_repos_remove};
pub use status::execute_status;
pub use sync::execute_sync;
pub use watch::execute_watch;

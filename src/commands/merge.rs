use crate::commands::sync::resolve_path;
use crate::core::{
    config::GlobalConfig, executor, git::GitRunner, print_success, Result,
};
use std::path::Path;

/// Manually merge candidate branches into main and push.
///
/// This is the explicit user action behind a `MergeCandidate` decision; it
/// is never triggered automatically.
pub fn execute_merge(path: &Path, branches: Vec<String>) -> Result<()> {
    let config = GlobalConfig::load_or_create()?;
    let repo = config.repository(&resolve_path(path))?;

    let runner = GitRunner::new(config.git_binary.clone(), repo.path.clone());
    executor::merge_branches(&runner, repo, &branches)?;

    print_success(&format!(
        "Merged {} branch(es): {}",
        branches.len(),
        branches.join(", ")
    ));

    Ok(())
}

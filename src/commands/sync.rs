use crate::core::{
    config::GlobalConfig, output::format_decision, print_success, scheduler::sync_once, Result,
};
use std::path::{Path, PathBuf};

/// Run one full Collector → Engine → Executor cycle for one repository now.
pub fn execute_sync(path: &Path) -> Result<()> {
    let config = GlobalConfig::load_or_create()?;
    let repo = config.repository(&resolve_path(path))?;

    let decision = sync_once(&config.git_binary, repo)?;
    println!("\n  {}", format_decision(&decision));
    print_success("Sync cycle completed");

    Ok(())
}

/// Configured paths are stored canonicalized; match lookups the same way.
pub fn resolve_path(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

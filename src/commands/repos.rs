use crate::commands::sync::resolve_path;
use crate::core::{
    check_health,
    config::{GlobalConfig, RepositoryConfig},
    git::GitRunner,
    print_info, print_section_header, print_success, Result,
};
use colored::*;
use std::path::Path;

/// List configured repositories and their settings.
pub fn execute_repos_list() -> Result<()> {
    let config = GlobalConfig::load_or_create()?;

    if config.repositories.is_empty() {
        print_info("No repositories configured. Add one with: git-shepherd repos add <path>");
        return Ok(());
    }

    print_section_header("Configured repositories");
    for repo in &config.repositories {
        println!(
            "  {} {}{} {} {}{}{}",
            repo.path.display().to_string().blue(),
            "(".bright_black(),
            repo.remote.white(),
            repo.main_branch.white(),
            repo.branch_prefix.white(),
            format!("* every {}s", repo.poll_interval_seconds).bright_black(),
            ")".bright_black()
        );
    }
    println!();

    Ok(())
}

/// Add a repository, auto-detecting its remote and main branch.
pub fn execute_repos_add(path: &Path) -> Result<()> {
    let mut config = GlobalConfig::load_or_create()?;
    let resolved = resolve_path(path);

    let runner = GitRunner::new(config.git_binary.clone(), &resolved);
    if !resolved.is_dir() || !runner.is_git_repo()? {
        return Err(crate::core::GitShepherdError::not_a_git_repo(resolved));
    }

    let mut repo = RepositoryConfig::new(&resolved);
    repo.detect_settings(&runner)?;
    check_health(&runner, &repo)?;

    log::debug!(
        "detected remote={} main={} for {}",
        repo.remote,
        repo.main_branch,
        resolved.display()
    );

    config.add_repository(repo);
    config.save()?;

    print_success(&format!("Added repository: {}", resolved.display()));
    Ok(())
}

/// Remove a repository from the configuration.
pub fn execute_repos_remove(path: &Path) -> Result<()> {
    let mut config = GlobalConfig::load_or_create()?;
    let resolved = resolve_path(path);

    if config.remove_repository(&resolved) {
        config.save()?;
        print_success(&format!("Removed repository: {}", resolved.display()));
    } else {
        print_info(&format!("Repository was not configured: {}", resolved.display()));
    }

    Ok(())
}

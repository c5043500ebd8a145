use crate::core::{
    config::GlobalConfig,
    output::format_decision,
    print_info, print_section_header,
    scheduler::{Herd, RepoEvent},
    Result,
};
use colored::*;

/// Start polling workers for every configured repository and stream their
/// events to the terminal until the process is interrupted.
pub fn execute_watch() -> Result<()> {
    let config = GlobalConfig::load_or_create()?;

    if config.repositories.is_empty() {
        print_info("No repositories configured. Add one with: git-shepherd repos add <path>");
        return Ok(());
    }

    let (mut herd, events) = Herd::new(config.git_binary.clone());
    for repo in &config.repositories {
        let id = herd.add_repository(repo.clone());
        log::info!("watching {id} every {}s", repo.poll_interval_seconds);
    }

    print_section_header(&format!(
        "Watching {} repositories (Ctrl-C to stop)",
        config.repositories.len()
    ));

    // The herd keeps one sender per worker alive; this loop ends only when
    // the process is interrupted.
    for event in events.iter() {
        match event {
            RepoEvent::DecisionChanged { repo, decision, at } => {
                println!(
                    "{} {} {}",
                    at.format("%H:%M:%S").to_string().bright_black(),
                    repo.to_string().blue(),
                    format_decision(&decision)
                );
            }
            RepoEvent::NewCommits {
                repo,
                branch,
                ahead,
                at,
            } => {
                println!(
                    "{} {} {}",
                    at.format("%H:%M:%S").to_string().bright_black(),
                    repo.to_string().blue(),
                    format!("new commits on {branch} (+{ahead})").white()
                );
            }
            RepoEvent::CycleError { repo, message, at } => {
                println!(
                    "{} {} {} {}",
                    at.format("%H:%M:%S").to_string().bright_black(),
                    repo.to_string().blue(),
                    "✕".red(),
                    message.white()
                );
            }
        }
    }

    herd.shutdown();
    Ok(())
}

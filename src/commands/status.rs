use crate::core::{
    config::GlobalConfig, output::format_decision, print_info, print_section_header,
    scheduler::observe_once, Result,
};

/// Run one read-only cycle per configured repository and render each decision.
///
/// Collect + decide only; the executor never runs here, so `status` is safe
/// to call while watchers are active elsewhere.
pub fn execute_status() -> Result<()> {
    let config = GlobalConfig::load_or_create()?;

    if config.repositories.is_empty() {
        print_info("No repositories configured. Add one with: git-shepherd repos add <path>");
        return Ok(());
    }

    print_section_header("Repositories");

    for repo in &config.repositories {
        let decision = observe_once(&config.git_binary, repo);
        println!(
            "  {}\n    {}",
            repo.path.display(),
            format_decision(&decision)
        );
    }
    println!();

    Ok(())
}

use clap::{Parser, Subcommand};
use git_shepherd::commands::*;
use git_shepherd::core::{error::Result, print_error};
use std::env;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "git-shepherd")]
#[command(about = "Deterministic multi-repository branch synchronization monitor")]
#[command(version = "0.1.0")]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll all configured repositories and stream sync events
    Watch,
    /// Run one read-only check per repository and show each decision
    Status,
    /// Run one full sync cycle for a repository now
    Sync {
        /// Path of a configured repository
        path: PathBuf,
    },
    /// Manually merge candidate branches into main and push
    Merge {
        /// Path of a configured repository
        path: PathBuf,
        /// Branch names offered by a merge-possible decision
        branches: Vec<String>,
    },
    /// Manage the monitored repository list
    Repos {
        #[command(subcommand)]
        command: ReposCommands,
    },
}

#[derive(Subcommand)]
enum ReposCommands {
    /// List configured repositories
    List,
    /// Add a repository (remote and main branch are auto-detected)
    Add {
        /// Path to a git repository
        path: PathBuf,
    },
    /// Remove a repository from the configuration
    Remove {
        /// Path of a configured repository
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configure logging based on --debug flag
    if cli.debug {
        env::set_var("RUST_LOG", "debug");
    } else {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let outcome = match cli.command {
        Commands::Watch => execute_watch(),
        Commands::Status => execute_status(),
        Commands::Sync { path } => execute_sync(&path),
        Commands::Merge { path, branches } => execute_merge(&path, branches),
        Commands::Repos { command } => match command {
            ReposCommands::List => execute_repos_list(),
            ReposCommands::Add { path } => execute_repos_add(&path),
            ReposCommands::Remove { path } => execute_repos_remove(&path),
        },
    };

    if let Err(e) = outcome {
        print_error(&e.to_string());
        std::process::exit(1);
    }

    Ok(())
}

//! Git repository management and setup utilities
//!
//! Builds the repository topology the sync engine operates on: a bare
//! "remote", the monitored working clone, and a second "agent" clone used
//! to push tracked branches the way coding agents would.

#![allow(dead_code)]

use git_shepherd::core::config::RepositoryConfig;
use git_shepherd::core::git::GitRunner;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A bare remote plus two clones. The TempDir must be kept alive for the
/// duration of the test to prevent cleanup.
pub struct SyncFixture {
    pub temp_dir: TempDir,
    /// Bare repository acting as the shared remote.
    pub remote: PathBuf,
    /// The monitored repository, checked out on main.
    pub work: PathBuf,
    /// A second clone for simulating agent pushes.
    pub agent: PathBuf,
}

impl SyncFixture {
    /// Set up remote + clones with one pushed commit on main.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("tempdir");
        let remote = temp_dir.path().join("remote.git");
        let work = temp_dir.path().join("work");
        let agent = temp_dir.path().join("agent");

        git_in(temp_dir.path(), &["init", "--bare", "-b", "main", "remote.git"]);

        clone(&remote, &work);
        // The clone of an empty remote starts on an unborn default branch;
        // pin it to main regardless of init.defaultBranch.
        git_in(&work, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        commit_file(&work, "README.md", "shepherd fixture\n", "Initial commit");
        git_in(&work, &["push", "-u", "origin", "main"]);

        clone(&remote, &agent);
        git_in(&agent, &["checkout", "main"]);

        SyncFixture {
            temp_dir,
            remote,
            work,
            agent,
        }
    }

    /// Repository config pointing at the monitored clone.
    pub fn config(&self) -> RepositoryConfig {
        RepositoryConfig::new(&self.work)
    }

    pub fn runner(&self) -> GitRunner {
        GitRunner::new("git", &self.work)
    }

    /// Commit on the monitored clone's local main without pushing.
    pub fn commit_on_main(&self, file: &str, content: &str, message: &str) {
        commit_file(&self.work, file, content, message);
    }

    /// Create (or reset) a branch from current remote main in the agent
    /// clone, commit the given files, and push it.
    pub fn push_agent_branch(&self, branch: &str, files: &[(&str, &str)]) {
        git_in(&self.agent, &["fetch", "origin"]);
        git_in(&self.agent, &["checkout", "-B", branch, "origin/main"]);
        for (file, content) in files {
            commit_file(&self.agent, file, content, &format!("Work on {file}"));
        }
        git_in(&self.agent, &["push", "origin", branch]);
    }

    /// Advance remote main through the agent clone, leaving the monitored
    /// clone's local main untouched.
    pub fn advance_remote_main(&self, file: &str, content: &str) {
        git_in(&self.agent, &["fetch", "origin"]);
        git_in(&self.agent, &["checkout", "-B", "main", "origin/main"]);
        commit_file(&self.agent, file, content, &format!("Advance main: {file}"));
        git_in(&self.agent, &["push", "origin", "main"]);
    }

    /// Tip commit of a ref on the remote, for asserting pushes landed.
    pub fn remote_tip(&self, branch: &str) -> String {
        let out = git_output(&self.remote, &["rev-parse", &format!("refs/heads/{branch}")]);
        out.trim().to_string()
    }

    /// Whether a file exists in the monitored clone's working tree.
    pub fn work_has_file(&self, file: &str) -> bool {
        self.work.join(file).exists()
    }
}

/// Run a git command in a directory and assert it succeeded.
pub fn git_in(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed in {}: {}",
        args,
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Run a git command and return its stdout.
pub fn git_output(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed in {}: {}",
        args,
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn clone(remote: &Path, target: &Path) {
    let parent = target.parent().expect("clone target parent");
    let name = target.file_name().expect("clone target name");
    let output = Command::new("git")
        .arg("clone")
        .arg(remote)
        .arg(name)
        .current_dir(parent)
        .output()
        .expect("failed to run git clone");
    assert!(
        output.status.success(),
        "git clone failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    // Identity config so commits never prompt.
    git_in(target, &["config", "user.name", "Test User"]);
    git_in(target, &["config", "user.email", "test@example.com"]);
}

/// Create a file and commit it.
pub fn commit_file(dir: &Path, file: &str, content: &str, message: &str) {
    if let Some(parent) = Path::new(file).parent() {
        std::fs::create_dir_all(dir.join(parent)).expect("create file parent");
    }
    std::fs::write(dir.join(file), content).expect("write file");
    git_in(dir, &["add", file]);
    git_in(dir, &["commit", "-m", message]);
}

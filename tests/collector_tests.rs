mod common;

use common::SyncFixture;
use git_shepherd::core::collector::{check_health, collect};
use git_shepherd::core::engine::{decide, Decision};
use git_shepherd::core::error::GitShepherdError;
use std::collections::BTreeSet;

#[test]
fn test_synced_repository_yields_empty_snapshot() -> anyhow::Result<()> {
    let fixture = SyncFixture::new();
    let snapshot = collect(&fixture.runner(), &fixture.config())?;

    assert!(snapshot.main.exists);
    assert_eq!(snapshot.main.local_ahead_of_remote, 0);
    assert!(snapshot.branches.is_empty());
    assert_eq!(decide(&snapshot.main, &snapshot.branches), Decision::Idle);
    Ok(())
}

#[test]
fn test_local_main_ahead_is_counted() -> anyhow::Result<()> {
    let fixture = SyncFixture::new();
    fixture.commit_on_main("local-a.txt", "a\n", "Local work a");
    fixture.commit_on_main("local-b.txt", "b\n", "Local work b");

    let snapshot = collect(&fixture.runner(), &fixture.config())?;
    assert_eq!(snapshot.main.local_ahead_of_remote, 2);
    assert_eq!(
        decide(&snapshot.main, &snapshot.branches),
        Decision::AutoPushMain { commits: 2 }
    );
    Ok(())
}

#[test]
fn test_ahead_branch_reports_its_changed_files() -> anyhow::Result<()> {
    let fixture = SyncFixture::new();
    fixture.push_agent_branch("claude/alpha", &[("x.py", "x\n"), ("y.py", "y\n")]);

    let snapshot = collect(&fixture.runner(), &fixture.config())?;
    assert_eq!(snapshot.branches.len(), 1);

    let branch = &snapshot.branches[0];
    assert_eq!(branch.name, "claude/alpha");
    assert_eq!(branch.ahead_of_main, 2);
    assert_eq!(branch.behind_main, 0);
    assert_eq!(
        branch.changed_files,
        BTreeSet::from(["x.py".to_string(), "y.py".to_string()])
    );
    Ok(())
}

#[test]
fn test_behind_branch_has_no_changed_files() -> anyhow::Result<()> {
    let fixture = SyncFixture::new();
    // Branch pinned at the old main tip, then main moves on.
    fixture.push_agent_branch("claude/stale", &[]);
    fixture.advance_remote_main("newer.txt", "newer\n");

    let snapshot = collect(&fixture.runner(), &fixture.config())?;
    let branch = &snapshot.branches[0];
    assert_eq!(branch.ahead_of_main, 0);
    assert_eq!(branch.behind_main, 1);
    assert!(branch.changed_files.is_empty());
    assert_eq!(
        decide(&snapshot.main, &snapshot.branches),
        Decision::AutoSyncBehind(vec!["claude/stale".to_string()])
    );
    Ok(())
}

#[test]
fn test_diverged_branch_reports_only_its_own_files() -> anyhow::Result<()> {
    let fixture = SyncFixture::new();
    fixture.push_agent_branch("claude/alpha", &[("branch-side.txt", "b\n")]);
    fixture.advance_remote_main("main-side.txt", "m\n");

    let snapshot = collect(&fixture.runner(), &fixture.config())?;
    let branch = &snapshot.branches[0];
    assert_eq!(branch.ahead_of_main, 1);
    assert_eq!(branch.behind_main, 1);
    assert!(branch.is_diverged());

    // The merge-base diff must not attribute main's file to the branch.
    assert_eq!(
        branch.changed_files,
        BTreeSet::from(["branch-side.txt".to_string()])
    );
    Ok(())
}

#[test]
fn test_branches_outside_prefix_are_invisible() -> anyhow::Result<()> {
    let fixture = SyncFixture::new();
    fixture.push_agent_branch("feature/other", &[("f.py", "f\n")]);
    fixture.push_agent_branch("claude/mine", &[("m.py", "m\n")]);

    let snapshot = collect(&fixture.runner(), &fixture.config())?;
    let names: Vec<&str> = snapshot.branches.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["claude/mine"]);
    Ok(())
}

#[test]
fn test_branches_are_sorted_by_name() -> anyhow::Result<()> {
    let fixture = SyncFixture::new();
    fixture.push_agent_branch("claude/zeta", &[("z.py", "z\n")]);
    fixture.push_agent_branch("claude/alpha", &[("a.py", "a\n")]);

    let snapshot = collect(&fixture.runner(), &fixture.config())?;
    let names: Vec<&str> = snapshot.branches.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["claude/alpha", "claude/zeta"]);
    Ok(())
}

#[test]
fn test_missing_remote_main_marks_nonexistent() -> anyhow::Result<()> {
    let fixture = SyncFixture::new();
    let mut config = fixture.config();
    config.main_branch = "trunk".to_string();

    let snapshot = collect(&fixture.runner(), &config)?;
    assert!(!snapshot.main.exists);
    assert_eq!(
        decide(&snapshot.main, &snapshot.branches).variant_name(),
        "GitError"
    );
    Ok(())
}

#[test]
fn test_unknown_remote_fails_health_check() {
    let fixture = SyncFixture::new();
    let mut config = fixture.config();
    config.remote = "upstream".to_string();

    let err = check_health(&fixture.runner(), &config).unwrap_err();
    assert!(matches!(err, GitShepherdError::RemoteNotFound { .. }));
}

#[test]
fn test_unreachable_remote_fails_collection() {
    let fixture = SyncFixture::new();
    let config = fixture.config();

    // Point origin at a path that no longer exists.
    common::git_in(
        &fixture.work,
        &["remote", "set-url", "origin", "/nonexistent/remote.git"],
    );

    let err = collect(&fixture.runner(), &config).unwrap_err();
    match err {
        GitShepherdError::GitCommand { context, stderr } => {
            assert!(context.contains("fetch"));
            assert!(!stderr.is_empty());
        }
        other => panic!("expected GitCommand error, got: {other}"),
    }
}

//! Repository scheduler: one polling worker per repository.
//!
//! Each repository gets a dedicated worker thread that owns its timer and
//! runs the Collector → Engine → Executor cycle on every tick or manual
//! trigger. Workers are fully independent of each other; the only shared
//! piece is the aggregated event channel observers consume.
//!
//! Within one repository, cycles are strictly sequential: the worker thread
//! is the per-repository mutual exclusion. Manual triggers that arrive while
//! a cycle runs are coalesced into at most one follow-up cycle, never queued.
//!
//! # Public API
//! - [`Herd`]: Aggregator owning all workers; hands out the event receiver
//! - [`RepoEvent`]: Observer-facing events (decision transitions, errors)
//! - [`RepoId`]: Stable identifier for a monitored repository

use crate::core::collector;
use crate::core::config::RepositoryConfig;
use crate::core::engine::{self, Decision};
use crate::core::error::Result;
use crate::core::executor;
use crate::core::git::GitRunner;
use crate::core::state::BranchStatus;
use chrono::{DateTime, Utc};
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Instant;

/// Identifies one monitored repository (its configured path).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId(String);

impl RepoId {
    pub fn from_path(path: &Path) -> Self {
        RepoId(path.display().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Events delivered to observers on the aggregated channel.
#[derive(Debug, Clone)]
pub enum RepoEvent {
    /// The decision's variant changed since the last cycle.
    DecisionChanged {
        repo: RepoId,
        decision: Decision,
        at: DateTime<Utc>,
    },
    /// A tracked branch gained commits since the previous cycle.
    NewCommits {
        repo: RepoId,
        branch: String,
        ahead: usize,
        at: DateTime<Utc>,
    },
    /// A collector or executor failure observers should surface.
    CycleError {
        repo: RepoId,
        message: String,
        at: DateTime<Utc>,
    },
}

enum WorkerCommand {
    SyncNow,
    Pause,
    Resume,
    Merge(Vec<String>),
    SetConfig(RepositoryConfig),
    Shutdown,
}

struct RepoHandle {
    cmd_tx: Sender<WorkerCommand>,
    thread: JoinHandle<()>,
    removed: Arc<AtomicBool>,
    last_decision: Arc<Mutex<Option<Decision>>>,
}

/// Owns the polling workers for every monitored repository.
pub struct Herd {
    git_binary: String,
    event_tx: Sender<RepoEvent>,
    workers: HashMap<RepoId, RepoHandle>,
}

impl Herd {
    /// Create the herd and the event channel observers read from.
    pub fn new(git_binary: impl Into<String>) -> (Self, Receiver<RepoEvent>) {
        let (event_tx, event_rx) = channel::unbounded();
        (
            Herd {
                git_binary: git_binary.into(),
                event_tx,
                workers: HashMap::new(),
            },
            event_rx,
        )
    }

    /// Start polling a repository. Replaces any existing worker for the
    /// same path.
    pub fn add_repository(&mut self, config: RepositoryConfig) -> RepoId {
        let id = RepoId::from_path(&config.path);
        self.remove_repository(&id);

        let (cmd_tx, cmd_rx) = channel::unbounded();
        let removed = Arc::new(AtomicBool::new(false));
        let last_decision = Arc::new(Mutex::new(None));

        let worker = Worker {
            id: id.clone(),
            config,
            git_binary: self.git_binary.clone(),
            cmd_rx,
            event_tx: self.event_tx.clone(),
            removed: Arc::clone(&removed),
            last_decision: Arc::clone(&last_decision),
        };

        let thread = std::thread::Builder::new()
            .name(format!("shepherd-{id}"))
            .spawn(move || worker.run())
            .expect("failed to spawn repository worker");

        self.workers.insert(
            id.clone(),
            RepoHandle {
                cmd_tx,
                thread,
                removed,
                last_decision,
            },
        );
        id
    }

    /// Stop polling a repository. No further cycles start, and an in-flight
    /// cycle's result is discarded instead of applied.
    pub fn remove_repository(&mut self, id: &RepoId) -> bool {
        if let Some(handle) = self.workers.remove(id) {
            handle.removed.store(true, Ordering::SeqCst);
            let _ = handle.cmd_tx.send(WorkerCommand::Shutdown);
            if handle.thread.join().is_err() {
                log::error!("worker thread for {id} panicked");
            }
            true
        } else {
            false
        }
    }

    /// Run a cycle immediately instead of waiting for the next tick. Also
    /// the manual re-check that revives a repository halted on an error.
    pub fn sync_now(&self, id: &RepoId) -> bool {
        self.send(id, WorkerCommand::SyncNow)
    }

    pub fn pause(&self, id: &RepoId) -> bool {
        self.send(id, WorkerCommand::Pause)
    }

    pub fn resume(&self, id: &RepoId) -> bool {
        self.send(id, WorkerCommand::Resume)
    }

    /// Manually merge offered candidate branches. Serialized with poll
    /// cycles by the worker thread.
    pub fn merge_branches(&self, id: &RepoId, branches: Vec<String>) -> bool {
        self.send(id, WorkerCommand::Merge(branches))
    }

    /// Apply edited settings and trigger one immediate re-check.
    pub fn update_config(&self, id: &RepoId, config: RepositoryConfig) -> bool {
        self.send(id, WorkerCommand::SetConfig(config))
    }

    /// Latest decision observed for a repository, if any cycle has run.
    pub fn current_decision(&self, id: &RepoId) -> Option<Decision> {
        let handle = self.workers.get(id)?;
        handle.last_decision.lock().ok()?.clone()
    }

    pub fn repo_ids(&self) -> Vec<RepoId> {
        self.workers.keys().cloned().collect()
    }

    /// Stop all workers and wait for them to finish.
    pub fn shutdown(mut self) {
        let ids: Vec<RepoId> = self.workers.keys().cloned().collect();
        for id in ids {
            self.remove_repository(&id);
        }
    }

    fn send(&self, id: &RepoId, command: WorkerCommand) -> bool {
        match self.workers.get(id) {
            Some(handle) => handle.cmd_tx.send(command).is_ok(),
            None => false,
        }
    }
}

struct Worker {
    id: RepoId,
    config: RepositoryConfig,
    git_binary: String,
    cmd_rx: Receiver<WorkerCommand>,
    event_tx: Sender<RepoEvent>,
    removed: Arc<AtomicBool>,
    last_decision: Arc<Mutex<Option<Decision>>>,
}

impl Worker {
    fn run(mut self) {
        let mut paused = false;
        let mut halted = false;
        let mut last_variant: Option<&'static str> = None;
        let mut last_ahead: HashMap<String, usize> = HashMap::new();

        // Preflight before the first cycle so a misconfigured repository
        // halts with a precise diagnostic instead of a raw fetch error.
        let runner = self.runner();
        if let Err(e) = collector::check_health(&runner, &self.config) {
            self.record_decision(Decision::GitError(e.to_string()), &mut last_variant);
            halted = true;
        }

        loop {
            if !paused && !halted {
                halted = self.run_cycle(&mut last_variant, &mut last_ahead);
                if self.removed.load(Ordering::SeqCst) {
                    return;
                }

                // Triggers that arrived while the cycle ran are dropped,
                // not replayed: the cycle already derived the decision they
                // would ask for.
                while let Ok(next) = self.cmd_rx.try_recv() {
                    match next {
                        WorkerCommand::Shutdown => return,
                        WorkerCommand::SyncNow => {}
                        WorkerCommand::Merge(branches) => {
                            self.run_merge(&branches);
                            if self.removed.load(Ordering::SeqCst) {
                                return;
                            }
                        }
                        other => self.apply_control(other, &mut paused, &mut halted),
                    }
                }
            }

            let deadline = Instant::now() + self.config.poll_interval();
            loop {
                // A halted or paused repository waits for commands only;
                // its timer is dead until sync_now/resume/config edit.
                let command = if paused || halted {
                    match self.cmd_rx.recv() {
                        Ok(c) => c,
                        Err(_) => return,
                    }
                } else {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    match self.cmd_rx.recv_timeout(remaining) {
                        Ok(c) => c,
                        Err(RecvTimeoutError::Timeout) => break,
                        Err(RecvTimeoutError::Disconnected) => return,
                    }
                };

                match command {
                    WorkerCommand::Shutdown => return,
                    WorkerCommand::SyncNow => {
                        // Coalesce queued triggers: they are dropped, not
                        // replayed as extra cycles.
                        while let Ok(next) = self.cmd_rx.try_recv() {
                            match next {
                                WorkerCommand::Shutdown => return,
                                WorkerCommand::SyncNow => {}
                                WorkerCommand::Merge(branches) => {
                                    self.run_merge(&branches);
                                    if self.removed.load(Ordering::SeqCst) {
                                        return;
                                    }
                                }
                                other => {
                                    self.apply_control(other, &mut paused, &mut halted);
                                }
                            }
                        }
                        halted = false;
                        break;
                    }
                    WorkerCommand::Resume => {
                        paused = false;
                        break;
                    }
                    WorkerCommand::SetConfig(config) => {
                        // Edited settings get one immediate re-check; a
                        // successful cycle revives a halted repository.
                        self.config = config;
                        halted = false;
                        break;
                    }
                    WorkerCommand::Merge(branches) => {
                        self.run_merge(&branches);
                        if self.removed.load(Ordering::SeqCst) {
                            return;
                        }
                        // Refresh the decision right away so observers see
                        // the post-merge state.
                        break;
                    }
                    other => self.apply_control(other, &mut paused, &mut halted),
                }
            }

            if paused || halted {
                // Re-enter the command wait without cycling.
                continue;
            }
        }
    }

    fn apply_control(&mut self, command: WorkerCommand, paused: &mut bool, halted: &mut bool) {
        match command {
            WorkerCommand::Pause => *paused = true,
            WorkerCommand::Resume => *paused = false,
            WorkerCommand::SetConfig(config) => {
                self.config = config;
                *halted = false;
            }
            WorkerCommand::SyncNow => *halted = false,
            WorkerCommand::Merge(_) | WorkerCommand::Shutdown => {}
        }
    }

    /// One full cycle. Returns whether polling must halt (collector error).
    fn run_cycle(
        &self,
        last_variant: &mut Option<&'static str>,
        last_ahead: &mut HashMap<String, usize>,
    ) -> bool {
        let runner = self.runner();

        let decision = match collector::collect(&runner, &self.config) {
            Ok(snapshot) => {
                self.detect_new_commits(&snapshot.branches, last_ahead);
                engine::decide(&snapshot.main, &snapshot.branches)
            }
            Err(e) => Decision::GitError(e.to_string()),
        };

        if self.removed.load(Ordering::SeqCst) {
            return true;
        }

        let halt = matches!(decision, Decision::GitError(_));
        let authorizes = decision.authorizes_action();
        self.record_decision(decision.clone(), last_variant);

        if halt {
            log::error!("{}: {decision}, polling halted until re-check", self.id);
            return true;
        }

        if matches!(decision, Decision::Idle) {
            last_ahead.clear();
        }

        if authorizes {
            match executor::execute(&runner, &self.config, &decision) {
                Ok(report) => log::info!("{}: {report:?}", self.id),
                Err(e) if e.is_race() => {
                    // Stale decision; the next cycle re-derives from fresh
                    // state. No user-visible error.
                    log::warn!("{}: {e}", self.id);
                }
                Err(e) => self.emit_error(e.to_string()),
            }
        }

        false
    }

    fn run_merge(&self, branches: &[String]) {
        if branches.is_empty() {
            log::warn!("{}: merge requested with no branches", self.id);
            return;
        }
        let runner = self.runner();
        match executor::merge_branches(&runner, &self.config, branches) {
            Ok(report) => log::info!("{}: {report:?}", self.id),
            Err(e) => self.emit_error(e.to_string()),
        }
    }

    fn detect_new_commits(
        &self,
        branches: &[BranchStatus],
        last_ahead: &mut HashMap<String, usize>,
    ) {
        for branch in branches {
            let previous = last_ahead
                .insert(branch.name.clone(), branch.ahead_of_main)
                .unwrap_or(0);
            if branch.ahead_of_main > previous {
                self.emit(RepoEvent::NewCommits {
                    repo: self.id.clone(),
                    branch: branch.name.clone(),
                    ahead: branch.ahead_of_main,
                    at: Utc::now(),
                });
            }
        }
    }

    fn record_decision(&self, decision: Decision, last_variant: &mut Option<&'static str>) {
        let variant = decision.variant_name();
        let changed = *last_variant != Some(variant);
        *last_variant = Some(variant);

        if let Ok(mut slot) = self.last_decision.lock() {
            *slot = Some(decision.clone());
        }

        if changed {
            self.emit(RepoEvent::DecisionChanged {
                repo: self.id.clone(),
                decision,
                at: Utc::now(),
            });
        }
    }

    fn emit_error(&self, message: String) {
        log::error!("{}: {message}", self.id);
        self.emit(RepoEvent::CycleError {
            repo: self.id.clone(),
            message,
            at: Utc::now(),
        });
    }

    fn emit(&self, event: RepoEvent) {
        if self.removed.load(Ordering::SeqCst) {
            return;
        }
        // Observers may be gone during shutdown; that is not an error.
        let _ = self.event_tx.send(event);
    }

    fn runner(&self) -> GitRunner {
        GitRunner::new(self.git_binary.clone(), &self.config.path)
    }
}

/// Run a single Collector → Engine cycle without a worker, for one-shot
/// CLI queries. Collector failures become a `GitError` decision.
pub fn observe_once(git_binary: &str, config: &RepositoryConfig) -> Decision {
    let runner = GitRunner::new(git_binary, &config.path);
    if let Err(e) = collector::check_health(&runner, config) {
        return Decision::GitError(e.to_string());
    }
    match collector::collect(&runner, config) {
        Ok(snapshot) => engine::decide(&snapshot.main, &snapshot.branches),
        Err(e) => Decision::GitError(e.to_string()),
    }
}

/// Run one full Collector → Engine → Executor cycle without a worker, for
/// the one-shot `sync` command.
pub fn sync_once(git_binary: &str, config: &RepositoryConfig) -> Result<Decision> {
    let runner = GitRunner::new(git_binary, config.path.as_path());
    collector::check_health(&runner, config)?;
    let snapshot = collector::collect(&runner, config)?;
    let decision = engine::decide(&snapshot.main, &snapshot.branches);
    if decision.authorizes_action() {
        executor::execute(&runner, config, &decision)?;
    }
    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_repo_id_from_path() {
        let id = RepoId::from_path(Path::new("/tmp/repo"));
        assert_eq!(id.as_str(), "/tmp/repo");
        assert_eq!(id.to_string(), "/tmp/repo");
    }

    #[test]
    fn test_bad_repository_halts_with_git_error() {
        let (mut herd, events) = Herd::new("git");
        let config = RepositoryConfig::new("/definitely/not/a/repository");
        let id = herd.add_repository(config);

        // The preflight fails, so the first event is a GitError transition.
        match events.recv_timeout(Duration::from_secs(10)) {
            Ok(RepoEvent::DecisionChanged { repo, decision, .. }) => {
                assert_eq!(repo, id);
                assert_eq!(decision.variant_name(), "GitError");
            }
            other => panic!("expected DecisionChanged, got: {other:?}"),
        }

        assert!(matches!(
            herd.current_decision(&id),
            Some(Decision::GitError(_))
        ));

        assert!(herd.remove_repository(&id));
        assert!(!herd.remove_repository(&id));
    }

    #[test]
    fn test_commands_to_unknown_repo_return_false() {
        let (herd, _events) = Herd::new("git");
        let id = RepoId::from_path(Path::new("/nowhere"));
        assert!(!herd.sync_now(&id));
        assert!(!herd.pause(&id));
        assert!(!herd.resume(&id));
        assert!(herd.current_decision(&id).is_none());
    }

    #[test]
    fn test_shutdown_joins_all_workers() {
        let (mut herd, _events) = Herd::new("git");
        herd.add_repository(RepositoryConfig::new("/nope/a"));
        herd.add_repository(RepositoryConfig::new("/nope/b"));
        assert_eq!(herd.repo_ids().len(), 2);
        herd.shutdown();
    }
}

//! Rotation orchestrator: one polling tick from start to reload.
//!
//! ## Tick flow
//!
//! ```text
//! clear observed files
//!   → clock.is_due() once            (force flag for the whole tick)
//!   → inventory.list()               (failure skips app files only)
//!   → + supervisor logs, dedup       (first-seen order)
//!   → per file, concurrently:
//!        stat → missing: skip
//!             → ok: observe; force || size >= max → rotate → prune
//!   → join, sort observed files into target order
//!   → reload supervisor logs         (atomic-rename strategy only)
//! ```
//!
//! ## Rules
//! - Per-file failures are logged and isolated; they never abort the tick
//! - Supervisor logs are always copy-truncated
//! - The clock is consulted exactly once per tick

use anyhow::Context;
use futures::future::join_all;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{
    ControlKind, InventorySource, RotationPolicy, RotationStrategy, WatchdogConfig,
};
use crate::inventory::{Pm2Inventory, ProcessInventory, StaticInventory};
use crate::rotation::time::wall_clock;
use crate::rotation::{RotationClock, RotationReason, TimeSource, prune, rotate};
use crate::supervisor::{
    NoopSupervisor, Pm2Supervisor, SignalSupervisor, SupervisorControl, SupervisorLogs,
};

/// Paths examined during the most recent tick.
///
/// Filled as stats complete. Cloning yields another handle to the same list,
/// so introspection callers can read it while a tick is in progress.
#[derive(Debug, Clone, Default)]
pub struct ObservedFiles {
    inner: Arc<Mutex<Vec<PathBuf>>>,
}

impl ObservedFiles {
    fn clear(&self) {
        self.inner.lock().clear();
    }

    fn push(&self, path: PathBuf) {
        self.inner.lock().push(path);
    }

    /// Sorts into target order; stats complete in arbitrary order.
    fn order_by(&self, targets: &[Target]) {
        self.inner
            .lock()
            .sort_by_key(|path| targets.iter().position(|t| &t.path == path));
    }

    /// Current contents.
    pub fn snapshot(&self) -> Vec<PathBuf> {
        self.inner.lock().clone()
    }
}

/// Who writes a watched file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOwner {
    /// A process from the inventory.
    Application,
    /// The supervisor itself.
    Supervisor,
}

/// A file selected for evaluation this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub path: PathBuf,
    pub owner: FileOwner,
}

/// What happened to one file during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// The file does not exist.
    Missing,
    /// The file could not be stat'ed.
    StatFailed,
    /// Below the size limit and no forced rotation.
    Unchanged,
    /// Rotated into `artifact`; `pruned` older artifacts were deleted.
    Rotated { artifact: PathBuf, pruned: usize },
    /// Rotation failed; pruning was skipped.
    RotationFailed,
}

/// Summary of one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Whether the interval clock forced rotation this tick.
    pub force: bool,
    /// False when the inventory could not be listed.
    pub inventory_ok: bool,
    /// Files that existed and were examined.
    pub observed: usize,
    /// Artifacts created this tick.
    pub rotated: Vec<PathBuf>,
    /// Files whose stat or rotation failed.
    pub failed: usize,
    /// Old artifacts deleted.
    pub pruned: usize,
    /// Whether the supervisor was asked to reload its logs.
    pub reloaded: bool,
}

/// Mutable state carried from tick to tick.
#[derive(Debug)]
struct WatchState {
    clock: RotationClock,
    observed: ObservedFiles,
}

/// Drives rotation ticks.
pub struct Orchestrator {
    policy: RotationPolicy,
    inventory: Arc<dyn ProcessInventory>,
    supervisor: Arc<dyn SupervisorControl>,
    supervisor_logs: SupervisorLogs,
    time: Arc<dyn TimeSource>,
    state: WatchState,
}

impl Orchestrator {
    /// Creates an orchestrator whose first interval window starts now.
    pub fn new(
        policy: RotationPolicy,
        inventory: Arc<dyn ProcessInventory>,
        supervisor: Arc<dyn SupervisorControl>,
        supervisor_logs: SupervisorLogs,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        let start = wall_clock(time.now(), policy.date_mode);
        let clock = RotationClock::new(start, policy.interval_unit);
        Self {
            policy,
            inventory,
            supervisor,
            supervisor_logs,
            time,
            state: WatchState {
                clock,
                observed: ObservedFiles::default(),
            },
        }
    }

    /// Builds an orchestrator with the backends selected in `config`.
    pub fn from_config(
        config: &WatchdogConfig,
        policy: RotationPolicy,
        time: Arc<dyn TimeSource>,
    ) -> anyhow::Result<Self> {
        let inventory: Arc<dyn ProcessInventory> = match config.inventory.source {
            InventorySource::Pm2 => Arc::new(Pm2Inventory::default()),
            InventorySource::Static => {
                Arc::new(StaticInventory::new(config.inventory.apps.clone()))
            },
        };

        let supervisor: Arc<dyn SupervisorControl> = match config.supervisor.control {
            ControlKind::Pm2 => Arc::new(Pm2Supervisor::default()),
            ControlKind::Signal => {
                let pid = config
                    .supervisor
                    .pid
                    .context("supervisor.control = \"signal\" requires supervisor.pid")?;
                Arc::new(SignalSupervisor::new(pid))
            },
            ControlKind::None => Arc::new(NoopSupervisor),
        };

        let home = config.supervisor_home()?;
        Ok(Self::new(
            policy,
            inventory,
            supervisor,
            SupervisorLogs::from_home(&home),
            time,
        ))
    }

    /// The active policy.
    pub const fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Paths examined during the most recent tick.
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.state.observed.snapshot()
    }

    /// A shared handle to the observed-file list.
    pub fn observed_files(&self) -> ObservedFiles {
        self.state.observed.clone()
    }

    /// Runs one polling tick.
    pub async fn tick(&mut self) -> TickReport {
        self.state.observed.clear();

        let now = self.time.now();
        let force = self
            .state
            .clock
            .is_due(wall_clock(now, self.policy.date_mode), &self.policy);

        let (targets, inventory_ok) = self.collect_targets().await;

        let this = &*self;
        let outcomes = join_all(
            targets
                .iter()
                .map(|target| this.process_file(target, force, now)),
        )
        .await;

        let mut report = TickReport {
            force,
            inventory_ok,
            ..TickReport::default()
        };
        self.state.observed.order_by(&targets);

        for outcome in outcomes {
            match outcome {
                FileOutcome::Missing => {},
                FileOutcome::StatFailed => report.failed += 1,
                FileOutcome::Unchanged => report.observed += 1,
                FileOutcome::Rotated { artifact, pruned } => {
                    report.observed += 1;
                    report.pruned += pruned;
                    report.rotated.push(artifact);
                },
                FileOutcome::RotationFailed => {
                    report.observed += 1;
                    report.failed += 1;
                },
            }
        }

        if self.policy.rotation_strategy == RotationStrategy::AtomicRename {
            match self.supervisor.reload_logs().await {
                Ok(()) => report.reloaded = true,
                Err(e) => tracing::error!(error = %e, "Failed to reload supervisor logs"),
            }
        }

        if report.rotated.is_empty() && report.failed == 0 {
            tracing::debug!(force, observed = report.observed, "Rotation tick complete");
        } else {
            tracing::info!(
                force,
                observed = report.observed,
                rotated = report.rotated.len(),
                pruned = report.pruned,
                failed = report.failed,
                "Rotation tick complete"
            );
        }

        report
    }

    /// Builds the deduplicated target list: inventory files, then supervisor logs.
    async fn collect_targets(&self) -> (Vec<Target>, bool) {
        let mut targets = Vec::new();
        let mut seen = HashSet::new();

        let inventory_ok = match self.inventory.list().await {
            Ok(apps) => {
                for app in apps {
                    for path in app.log_paths() {
                        push_unique(&mut targets, &mut seen, path, FileOwner::Application);
                    }
                }
                true
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to list monitored processes");
                false
            },
        };

        for path in self.supervisor_logs.paths() {
            push_unique(
                &mut targets,
                &mut seen,
                path.to_path_buf(),
                FileOwner::Supervisor,
            );
        }

        (targets, inventory_ok)
    }

    async fn process_file(
        &self,
        target: &Target,
        force: bool,
        now: chrono::DateTime<chrono::Utc>,
    ) -> FileOutcome {
        let path = target.path.as_path();
        let metadata = match tokio::fs::metadata(path).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return FileOutcome::Missing,
            Err(e) => {
                tracing::warn!(
                    log = %path.display(),
                    error = %e,
                    "Failed to stat log file"
                );
                return FileOutcome::StatFailed;
            },
        };

        self.state.observed.push(path.to_path_buf());

        let reason = if force {
            RotationReason::Time
        } else if metadata.len() >= self.policy.max_size_bytes {
            RotationReason::Size
        } else {
            return FileOutcome::Unchanged;
        };

        let strategy = match target.owner {
            FileOwner::Supervisor => RotationStrategy::CopyTruncate,
            FileOwner::Application => self.policy.rotation_strategy,
        };

        let artifact = match rotate(path, strategy, &self.policy, now, reason).await {
            Ok(artifact) => artifact,
            Err(e) => {
                tracing::error!(
                    log = %path.display(),
                    reason = %reason,
                    error = %e,
                    "Failed to rotate log file"
                );
                return FileOutcome::RotationFailed;
            },
        };

        let pruned = match self.policy.retain_count {
            Some(retain) => prune_quietly(path, retain).await,
            None => 0,
        };

        FileOutcome::Rotated { artifact, pruned }
    }
}

async fn prune_quietly(path: &Path, retain: usize) -> usize {
    match prune(path, retain).await {
        Ok(report) => report.deleted.len(),
        Err(e) => {
            tracing::warn!(
                log = %path.display(),
                error = %e,
                "Failed to prune rotated logs"
            );
            0
        },
    }
}

fn push_unique(
    targets: &mut Vec<Target>,
    seen: &mut HashSet<PathBuf>,
    path: PathBuf,
    owner: FileOwner,
) {
    if seen.insert(path.clone()) {
        targets.push(Target { path, owner });
    }
}

//! Polling loop driving the orchestrator.
//!
//! Ticks are aligned to multiples of the period since the Unix epoch, so two
//! watchdogs with the same period tick together. A tick that overruns the
//! period causes the missed ticks to be skipped, never queued: ticks never
//! overlap.

use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

use crate::orchestrator::{ObservedFiles, Orchestrator};

/// Delay from `now_ms` (milliseconds since the epoch) to the next multiple of
/// `period`. Exactly on a boundary, the delay is a full period.
pub fn initial_delay(now_ms: i64, period: Duration) -> Duration {
    let period_ms = i64::try_from(period.as_millis()).unwrap_or(i64::MAX).max(1);
    let elapsed = now_ms.rem_euclid(period_ms);
    Duration::from_millis((period_ms - elapsed) as u64)
}

/// Runs ticks on a fixed period until `shutdown` resolves.
pub struct Worker {
    orchestrator: Orchestrator,
    period: Duration,
}

impl Worker {
    pub const fn new(orchestrator: Orchestrator, period: Duration) -> Self {
        Self {
            orchestrator,
            period,
        }
    }

    /// Runs until `shutdown` completes. A tick in progress finishes first.
    pub async fn run<F>(mut self, shutdown: F) -> Orchestrator
    where
        F: Future<Output = ()>,
    {
        let delay = initial_delay(chrono::Utc::now().timestamp_millis(), self.period);
        let mut interval = tokio::time::interval_at(Instant::now() + delay, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let introspection = spawn_introspection(self.orchestrator.observed_files());

        tracing::info!(
            period_secs = self.period.as_secs(),
            first_tick_in_ms = delay.as_millis() as u64,
            "Rotation worker started"
        );

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.orchestrator.tick().await;
                }
                () = &mut shutdown => {
                    tracing::info!("Rotation worker shutting down");
                    break;
                }
            }
        }

        if let Some(handle) = introspection {
            handle.abort();
        }
        self.orchestrator
    }
}

/// Logs the observed files whenever the process receives `SIGUSR1`.
#[cfg(unix)]
fn spawn_introspection(observed: ObservedFiles) -> Option<tokio::task::JoinHandle<()>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut stream = match signal(SignalKind::user_defined1()) {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install SIGUSR1 handler");
            return None;
        },
    };

    Some(tokio::spawn(async move {
        while stream.recv().await.is_some() {
            let files = observed.snapshot();
            tracing::info!(
                count = files.len(),
                files = ?files,
                "Files observed during the last tick"
            );
        }
    }))
}

#[cfg(not(unix))]
fn spawn_introspection(_observed: ObservedFiles) -> Option<tokio::task::JoinHandle<()>> {
    None
}

/// Resolves on Ctrl+C or `SIGTERM`.
///
/// A handler that cannot be installed is logged and never fires.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            },
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping watchdog...");
}

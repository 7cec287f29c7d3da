//! Supervisor control and the supervisor's own log files.
//!
//! After an atomic-rename tick the supervisor must reopen every log handle it
//! manages, otherwise writers keep appending to the renamed artifacts.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::constants::{PM2_BINARY, SUPERVISOR_AGENT_LOG_NAME, SUPERVISOR_LOG_NAME};
use crate::error::{Error, Result};

/// Asks the supervising runtime to reopen its log handles.
#[async_trait]
pub trait SupervisorControl: Send + Sync {
    async fn reload_logs(&self) -> Result<()>;
}

/// Control backend that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSupervisor;

#[async_trait]
impl SupervisorControl for NoopSupervisor {
    async fn reload_logs(&self) -> Result<()> {
        tracing::debug!("Log reload skipped (no supervisor control configured)");
        Ok(())
    }
}

/// Runs `pm2 reloadLogs`.
#[derive(Debug, Clone)]
pub struct Pm2Supervisor {
    binary: PathBuf,
}

impl Default for Pm2Supervisor {
    fn default() -> Self {
        Self::new(PM2_BINARY)
    }
}

impl Pm2Supervisor {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl SupervisorControl for Pm2Supervisor {
    async fn reload_logs(&self) -> Result<()> {
        let output = Command::new(&self.binary)
            .arg("reloadLogs")
            .output()
            .await
            .map_err(|e| {
                Error::Supervisor(format!(
                    "failed to run {} reloadLogs: {e}",
                    self.binary.display()
                ))
            })?;

        if !output.status.success() {
            return Err(Error::Supervisor(format!(
                "{} reloadLogs exited with {}: {}",
                self.binary.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        tracing::info!("Supervisor log handles reloaded");
        Ok(())
    }
}

/// Sends `SIGUSR2` to the supervisor process.
#[derive(Debug, Clone, Copy)]
pub struct SignalSupervisor {
    pid: i32,
}

impl SignalSupervisor {
    pub const fn new(pid: i32) -> Self {
        Self { pid }
    }
}

#[async_trait]
impl SupervisorControl for SignalSupervisor {
    #[cfg(unix)]
    async fn reload_logs(&self) -> Result<()> {
        use nix::sys::signal::{Signal, kill};
        use nix::unistd::Pid;

        kill(Pid::from_raw(self.pid), Signal::SIGUSR2).map_err(|e| {
            Error::Supervisor(format!("failed to signal pid {}: {e}", self.pid))
        })?;
        tracing::info!(pid = self.pid, "Sent log reload signal to supervisor");
        Ok(())
    }

    #[cfg(not(unix))]
    async fn reload_logs(&self) -> Result<()> {
        Err(Error::Supervisor(format!(
            "cannot signal pid {}: signals are unix-only",
            self.pid
        )))
    }
}

/// The supervisor's own log files.
///
/// The supervisor does not reopen these on rename, so they are always
/// rotated with copy-truncate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorLogs {
    pub daemon_log: PathBuf,
    pub agent_log: PathBuf,
}

impl SupervisorLogs {
    /// Log paths inside the supervisor home (e.g. `~/.pm2`).
    pub fn from_home(home: &Path) -> Self {
        Self {
            daemon_log: home.join(SUPERVISOR_LOG_NAME),
            agent_log: home.join(SUPERVISOR_AGENT_LOG_NAME),
        }
    }

    /// Both paths, daemon log first.
    pub fn paths(&self) -> [&Path; 2] {
        [&self.daemon_log, &self.agent_log]
    }
}

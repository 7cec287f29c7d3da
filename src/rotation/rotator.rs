//! Rotation of a single log file.
//!
//! Two strategies are supported:
//!
//! 1. **Atomic rename**: the file is renamed to its artifact name. Writers must
//!    reopen the path afterwards, so the supervisor is asked to reload its logs
//!    at the end of the tick.
//! 2. **Copy-truncate**: the content is streamed into the artifact (append
//!    mode), then the live file is truncated to zero. Writers keep their handle.
//!
//! A failed truncate leaves an already-copied artifact behind. The next tick's
//! size check rotates again and appends to, or creates, another artifact.

use chrono::{DateTime, Utc};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

use super::naming::artifact_path;
use super::time::stamp;
use crate::config::{RotationPolicy, RotationStrategy};
use crate::error::{Error, Result};

/// Why a file was rotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationReason {
    /// The file reached `max_size_bytes`.
    Size,
    /// The rotation interval elapsed.
    Time,
}

impl fmt::Display for RotationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Size => f.write_str("size"),
            Self::Time => f.write_str("time"),
        }
    }
}

/// Rotates `path` using `strategy`, stamping the artifact with `now`.
///
/// `strategy` is passed separately from `policy` because supervisor logs are
/// always copy-truncated whatever the configured strategy.
///
/// # Returns
///
/// The path of the created artifact.
pub async fn rotate(
    path: &Path,
    strategy: RotationStrategy,
    policy: &RotationPolicy,
    now: DateTime<Utc>,
    reason: RotationReason,
) -> Result<PathBuf> {
    let timestamp = stamp(now, policy.date_mode, &policy.date_format);
    let artifact = artifact_path(path, &timestamp)?;

    match strategy {
        RotationStrategy::AtomicRename => {
            fs::rename(path, &artifact).await.map_err(|e| {
                Error::io(
                    format!("rename {} to {}", path.display(), artifact.display()),
                    e,
                )
            })?;
        },
        RotationStrategy::CopyTruncate => copy_truncate(path, &artifact).await?,
    }

    tracing::info!(
        log = %path.display(),
        rotated_to = %artifact.display(),
        reason = %reason,
        strategy = %strategy,
        "Rotated log file"
    );

    Ok(artifact)
}

async fn copy_truncate(path: &Path, artifact: &Path) -> Result<()> {
    let mut source = File::open(path)
        .await
        .map_err(|e| Error::io(format!("open {}", path.display()), e))?;

    let mut sink = OpenOptions::new()
        .create(true)
        .append(true)
        .open(artifact)
        .await
        .map_err(|e| Error::io(format!("open {}", artifact.display()), e))?;

    let copied = tokio::io::copy(&mut source, &mut sink)
        .await
        .map_err(|e| {
            Error::io(
                format!("copy {} to {}", path.display(), artifact.display()),
                e,
            )
        })?;
    sink.flush()
        .await
        .map_err(|e| Error::io(format!("flush {}", artifact.display()), e))?;
    drop(source);

    let live = OpenOptions::new()
        .write(true)
        .open(path)
        .await
        .map_err(|e| Error::io(format!("open {} for truncate", path.display()), e))?;
    live.set_len(0)
        .await
        .map_err(|e| Error::io(format!("truncate {}", path.display()), e))?;

    tracing::debug!(
        log = %path.display(),
        bytes = copied,
        "Copied and truncated log file"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_settings, parse};
    use chrono::TimeZone;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn policy(strategy: &str) -> RotationPolicy {
        let mut raw = HashMap::new();
        raw.insert("date_mode".to_string(), "utc".to_string());
        raw.insert("date_format".to_string(), "YYYY-MM-DD".to_string());
        raw.insert("rotation_strategy".to_string(), strategy.to_string());
        parse(&raw, &default_settings()).unwrap()
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 3, 4, 5, 6).unwrap()
    }

    #[tokio::test]
    async fn test_copy_truncate_empties_original() {
        let temp_dir = TempDir::new().unwrap();
        let log_file = temp_dir.path().join("app.log");
        std::fs::write(&log_file, "line one\nline two\n").unwrap();

        let policy = policy("copytruncate");
        let artifact = rotate(
            &log_file,
            policy.rotation_strategy,
            &policy,
            fixed_now(),
            RotationReason::Size,
        )
        .await
        .unwrap();

        assert_eq!(artifact, temp_dir.path().join("app__2025-02-03.log"));
        assert_eq!(std::fs::read_to_string(&artifact).unwrap(), "line one\nline two\n");
        assert_eq!(std::fs::metadata(&log_file).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_copy_truncate_appends_to_existing_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let log_file = temp_dir.path().join("app.log");
        let artifact = temp_dir.path().join("app__2025-02-03.log");
        std::fs::write(&artifact, "earlier\n").unwrap();
        std::fs::write(&log_file, "later\n").unwrap();

        let policy = policy("copytruncate");
        rotate(
            &log_file,
            policy.rotation_strategy,
            &policy,
            fixed_now(),
            RotationReason::Time,
        )
        .await
        .unwrap();

        assert_eq!(std::fs::read_to_string(&artifact).unwrap(), "earlier\nlater\n");
    }

    #[tokio::test]
    async fn test_atomic_rename_moves_original() {
        let temp_dir = TempDir::new().unwrap();
        let log_file = temp_dir.path().join("app.log");
        std::fs::write(&log_file, "content").unwrap();

        let policy = policy("reload");
        let artifact = rotate(
            &log_file,
            policy.rotation_strategy,
            &policy,
            fixed_now(),
            RotationReason::Size,
        )
        .await
        .unwrap();

        assert!(!log_file.exists());
        assert_eq!(std::fs::read_to_string(artifact).unwrap(), "content");
    }

    #[tokio::test]
    async fn test_strategy_override_beats_policy() {
        let temp_dir = TempDir::new().unwrap();
        let log_file = temp_dir.path().join("pm2.log");
        std::fs::write(&log_file, "supervisor").unwrap();

        let policy = policy("reload");
        rotate(
            &log_file,
            RotationStrategy::CopyTruncate,
            &policy,
            fixed_now(),
            RotationReason::Size,
        )
        .await
        .unwrap();

        assert!(log_file.exists());
        assert_eq!(std::fs::metadata(&log_file).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_rename_missing_file_fails_without_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let log_file = temp_dir.path().join("gone.log");

        let policy = policy("reload");
        let result = rotate(
            &log_file,
            policy.rotation_strategy,
            &policy,
            fixed_now(),
            RotationReason::Size,
        )
        .await;

        assert!(result.unwrap_err().is_not_found());
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(RotationReason::Size.to_string(), "size");
        assert_eq!(RotationReason::Time.to_string(), "time");
    }
}

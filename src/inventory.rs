//! Process inventory: which log files belong to monitored processes.
//!
//! The inventory is an external collaborator consulted once per tick.
//! Two backends are provided:
//!
//! - [`Pm2Inventory`]: runs `pm2 jlist` and reads each process's log paths
//! - [`StaticInventory`]: a fixed list, typically from `logrotate.toml`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tokio::process::Command;

use crate::constants::PM2_BINARY;
use crate::error::{Error, Result};

/// Log file paths of one monitored process. Any of them may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessLogs {
    /// Process name, used only for logging.
    #[serde(default)]
    pub name: String,
    /// Standard output log.
    #[serde(default, rename = "out_log")]
    pub output_log: Option<PathBuf>,
    /// Standard error log.
    #[serde(default, rename = "err_log")]
    pub error_log: Option<PathBuf>,
    /// Combined output and error log.
    #[serde(default, rename = "log")]
    pub combined_log: Option<PathBuf>,
}

impl ProcessLogs {
    /// Distinct, normalized log paths in output, error, combined order.
    ///
    /// Null devices are skipped: processes with logging disabled point there.
    pub fn log_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = Vec::with_capacity(3);
        for path in [&self.output_log, &self.error_log, &self.combined_log]
            .into_iter()
            .flatten()
        {
            if is_null_device(path) {
                continue;
            }
            let normalized = normalize_path(path);
            if !paths.contains(&normalized) {
                paths.push(normalized);
            }
        }
        paths
    }
}

/// Lists monitored processes and their log files.
#[async_trait]
pub trait ProcessInventory: Send + Sync {
    async fn list(&self) -> Result<Vec<ProcessLogs>>;
}

/// A fixed process list.
#[derive(Debug, Clone, Default)]
pub struct StaticInventory {
    apps: Vec<ProcessLogs>,
}

impl StaticInventory {
    pub const fn new(apps: Vec<ProcessLogs>) -> Self {
        Self { apps }
    }
}

#[async_trait]
impl ProcessInventory for StaticInventory {
    async fn list(&self) -> Result<Vec<ProcessLogs>> {
        Ok(self.apps.clone())
    }
}

/// Reads the process list from the pm2 CLI.
#[derive(Debug, Clone)]
pub struct Pm2Inventory {
    binary: PathBuf,
}

impl Default for Pm2Inventory {
    fn default() -> Self {
        Self::new(PM2_BINARY)
    }
}

impl Pm2Inventory {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl ProcessInventory for Pm2Inventory {
    async fn list(&self) -> Result<Vec<ProcessLogs>> {
        let output = Command::new(&self.binary)
            .arg("jlist")
            .output()
            .await
            .map_err(|e| {
                Error::Inventory(format!(
                    "failed to run {} jlist: {e}",
                    self.binary.display()
                ))
            })?;

        if !output.status.success() {
            return Err(Error::Inventory(format!(
                "{} jlist exited with {}: {}",
                self.binary.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_jlist(&String::from_utf8_lossy(&output.stdout))
    }
}

#[derive(Debug, Deserialize)]
struct Pm2Process {
    #[serde(default)]
    name: String,
    #[serde(default)]
    pm2_env: serde_json::Map<String, serde_json::Value>,
}

/// Parses `pm2 jlist` output.
///
/// pm2 may print banner lines before the JSON array; anything before the
/// first `[` is ignored.
pub fn parse_jlist(stdout: &str) -> Result<Vec<ProcessLogs>> {
    let start = stdout.find('[').ok_or_else(|| {
        Error::Inventory("pm2 jlist output contains no process list".to_string())
    })?;
    let processes: Vec<Pm2Process> = serde_json::from_str(&stdout[start..])
        .map_err(|e| Error::Inventory(format!("invalid pm2 jlist output: {e}")))?;

    Ok(processes
        .into_iter()
        .map(|p| ProcessLogs {
            output_log: env_path(&p.pm2_env, "pm_out_log_path"),
            error_log: env_path(&p.pm2_env, "pm_err_log_path"),
            combined_log: env_path(&p.pm2_env, "pm_log_path"),
            name: p.name,
        })
        .collect())
}

fn env_path(env: &serde_json::Map<String, serde_json::Value>, key: &str) -> Option<PathBuf> {
    env.get(key)
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

fn is_null_device(path: &Path) -> bool {
    path == Path::new("/dev/null") || path.as_os_str().eq_ignore_ascii_case("NUL")
}

/// Lexically normalizes a path: drops `.` and folds `..` where possible.
///
/// The filesystem is not consulted, so symlinks are left alone.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                let last_is_normal =
                    matches!(out.components().next_back(), Some(Component::Normal(_)));
                let at_root = matches!(
                    out.components().next_back(),
                    Some(Component::RootDir | Component::Prefix(_))
                );
                if last_is_normal {
                    out.pop();
                } else if !at_root {
                    out.push("..");
                }
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/a/./b/../c.log")),
            PathBuf::from("/a/c.log")
        );
        assert_eq!(normalize_path(Path::new("/../x.log")), PathBuf::from("/x.log"));
        assert_eq!(
            normalize_path(Path::new("../x/./y.log")),
            PathBuf::from("../x/y.log")
        );
        assert_eq!(
            normalize_path(Path::new("/var//log/app.log")),
            PathBuf::from("/var/log/app.log")
        );
    }

    #[test]
    fn test_log_paths_dedup_and_skip_null() {
        let app = ProcessLogs {
            name: "api".to_string(),
            output_log: Some(PathBuf::from("/logs/api.log")),
            error_log: Some(PathBuf::from("/logs/./api.log")),
            combined_log: Some(PathBuf::from("/dev/null")),
        };
        assert_eq!(app.log_paths(), vec![PathBuf::from("/logs/api.log")]);
    }

    #[test]
    fn test_log_paths_order() {
        let app = ProcessLogs {
            name: "worker".to_string(),
            output_log: Some(PathBuf::from("/l/out.log")),
            error_log: Some(PathBuf::from("/l/err.log")),
            combined_log: Some(PathBuf::from("/l/all.log")),
        };
        assert_eq!(
            app.log_paths(),
            vec![
                PathBuf::from("/l/out.log"),
                PathBuf::from("/l/err.log"),
                PathBuf::from("/l/all.log"),
            ]
        );
    }

    #[test]
    fn test_parse_jlist() {
        let stdout = r#">>>> In-memory PM2 is out-of-date
[{"name":"api","pm2_env":{"pm_out_log_path":"/home/u/.pm2/logs/api-out.log","pm_err_log_path":"/home/u/.pm2/logs/api-error.log","pm_log_path":false}},
 {"name":"bare","pm2_env":{}}]"#;
        let apps = parse_jlist(stdout).unwrap();
        assert_eq!(apps.len(), 2);
        assert_eq!(apps[0].name, "api");
        assert_eq!(
            apps[0].output_log,
            Some(PathBuf::from("/home/u/.pm2/logs/api-out.log"))
        );
        assert!(apps[0].combined_log.is_none());
        assert!(apps[1].log_paths().is_empty());
    }

    #[test]
    fn test_parse_jlist_garbage() {
        assert!(matches!(parse_jlist("not json"), Err(Error::Inventory(_))));
        assert!(matches!(parse_jlist("[{]"), Err(Error::Inventory(_))));
    }

    #[tokio::test]
    async fn test_static_inventory() {
        let inventory = StaticInventory::new(vec![ProcessLogs {
            name: "a".to_string(),
            output_log: Some(PathBuf::from("/tmp/a.log")),
            ..ProcessLogs::default()
        }]);
        let apps = inventory.list().await.unwrap();
        assert_eq!(apps.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_pm2_binary_is_inventory_error() {
        let inventory = Pm2Inventory::new("/nonexistent/pm2-binary");
        assert!(matches!(inventory.list().await, Err(Error::Inventory(_))));
    }
}

//! Logging Infrastructure
//!
//! Structured logging to stdout, or to daily rolling files when a log
//! directory is configured. `RUST_LOG` takes precedence over the configured
//! level.

use std::path::Path;
use std::time::{Duration, SystemTime};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Rolling log file prefix
const LOG_FILE_PREFIX: &str = "yard-ledger";

/// How often [`run_log_cleanup`] prunes the log directory
pub const LOG_CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// Initialize the logger with defaults
pub fn init_logger() {
    init_logger_with_file(None, None, None);
}

/// Initialize the logger with optional JSON lines and file output
pub fn init_logger_with_file(log_level: Option<&str>, json: Option<bool>, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    let file_appender = log_dir
        .map(Path::new)
        .filter(|p| p.exists())
        .map(|p| tracing_appender::rolling::daily(p, LOG_FILE_PREFIX));

    // try_init: a second call (tests, embedding hosts) keeps the first subscriber
    let result = match (json.unwrap_or(false), file_appender) {
        (true, Some(appender)) => subscriber.json().with_writer(appender).try_init(),
        (true, None) => subscriber.json().try_init(),
        (false, Some(appender)) => subscriber.with_ansi(false).with_writer(appender).try_init(),
        (false, None) => subscriber.try_init(),
    };
    if let Err(e) = result {
        tracing::debug!(error = %e, "Logger already initialized");
    }
}

/// Delete rolled log files older than `days`, returning how many were removed
pub fn cleanup_old_logs(log_dir: &str, days: u64) -> std::io::Result<usize> {
    let max_age = Duration::from_secs(days * 24 * 60 * 60);
    let now = SystemTime::now();
    let mut removed = 0;

    for entry in std::fs::read_dir(log_dir)? {
        let entry = entry?;
        let is_log = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX));
        if !is_log || !entry.file_type()?.is_file() {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        if now.duration_since(modified).unwrap_or_default() > max_age {
            std::fs::remove_file(entry.path())?;
            removed += 1;
        }
    }

    if removed > 0 {
        tracing::info!(log_dir, removed, "Old log files removed");
    }
    Ok(removed)
}

/// Prune old logs every `interval` until shutdown
///
/// The first tick fires immediately; startup pruning is done by the first pass.
pub async fn run_log_cleanup(
    log_dir: String,
    days: u64,
    interval: Duration,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::debug!("Log cleanup shutting down");
                break;
            }
            _ = ticker.tick() => {
                if let Err(e) = cleanup_old_logs(&log_dir, days) {
                    tracing::error!(log_dir = %log_dir, error = %e, "Failed to cleanup old logs");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_keeps_fresh_and_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let old_log = dir.path().join("yard-ledger.2026-01-01");
        std::fs::write(&old_log, "x").unwrap();
        std::fs::write(dir.path().join("yard-ledger.2026-10-14"), "x").unwrap();
        std::fs::write(dir.path().join("other.log"), "x").unwrap();
        let path = dir.path().to_str().unwrap();

        assert_eq!(cleanup_old_logs(path, 7).unwrap(), 0);

        let month_ago = SystemTime::now() - Duration::from_secs(30 * 24 * 60 * 60);
        std::fs::File::options()
            .write(true)
            .open(&old_log)
            .unwrap()
            .set_modified(month_ago)
            .unwrap();
        assert_eq!(cleanup_old_logs(path, 7).unwrap(), 1);
        assert!(!old_log.exists());
        assert!(dir.path().join("yard-ledger.2026-10-14").exists());
        assert!(dir.path().join("other.log").exists());
    }

    #[tokio::test]
    async fn test_periodic_cleanup_prunes_until_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let old_log = dir.path().join("yard-ledger.2026-01-01");
        std::fs::write(&old_log, "x").unwrap();
        let month_ago = SystemTime::now() - Duration::from_secs(30 * 24 * 60 * 60);
        std::fs::File::options()
            .write(true)
            .open(&old_log)
            .unwrap()
            .set_modified(month_ago)
            .unwrap();

        let shutdown = CancellationToken::new();
        let task = tokio::spawn(run_log_cleanup(
            dir.path().to_string_lossy().into_owned(),
            7,
            Duration::from_millis(20),
            shutdown.clone(),
        ));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!old_log.exists());

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logger();
        init_logger_with_file(Some("debug"), Some(true), None);
    }
}

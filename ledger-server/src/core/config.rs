use std::path::PathBuf;
use std::str::FromStr;

/// Ledger server configuration
///
/// # Environment variables
///
/// Every field can be overridden from the environment (a `.env` file in the
/// working directory is loaded first):
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/yard-ledger | Working directory |
/// | DB_FILE | ledger.redb | Database file, relative to `WORK_DIR/database` |
/// | LOG_LEVEL | info | Max log level |
/// | LOG_DIR | (unset) | Daily rolling log directory; stdout when unset |
/// | LOG_JSON | false | JSON log lines |
/// | LOG_RETENTION_DAYS | 30 | Rolled log files older than this are deleted, 0 keeps all |
/// | EVENT_CHANNEL_CAPACITY | 1024 | Ledger event broadcast capacity |
/// | RECOMPUTE_QUEUE_CAPACITY | 256 | Pending GP recompute requests |
/// | RECOMPUTE_ON_STARTUP | true | Full GP recompute before serving |
/// | RECOMPUTE_INTERVAL_SECS | 0 | Periodic full recompute, 0 disables |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | Grace period for background tasks |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/ledger LOG_LEVEL=debug cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub db_file: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_json: bool,
    pub log_retention_days: u64,
    pub event_channel_capacity: usize,
    pub recompute_queue_capacity: usize,
    pub recompute_on_startup: bool,
    pub recompute_interval_secs: u64,
    pub shutdown_timeout_ms: u64,
}

impl Config {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/yard-ledger".into()),
            db_file: std::env::var("DB_FILE").unwrap_or_else(|_| "ledger.redb".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty()),
            log_json: env_or("LOG_JSON", false),
            log_retention_days: env_or("LOG_RETENTION_DAYS", 30),
            event_channel_capacity: env_or("EVENT_CHANNEL_CAPACITY", 1024),
            recompute_queue_capacity: env_or("RECOMPUTE_QUEUE_CAPACITY", 256),
            recompute_on_startup: env_or("RECOMPUTE_ON_STARTUP", true),
            recompute_interval_secs: env_or("RECOMPUTE_INTERVAL_SECS", 0),
            shutdown_timeout_ms: env_or("SHUTDOWN_TIMEOUT_MS", 10000),
        }
    }

    /// Override the working directory
    ///
    /// Mostly used by tests.
    pub fn with_work_dir(work_dir: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config
    }

    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    pub fn db_path(&self) -> PathBuf {
        self.database_dir().join(&self.db_file)
    }

    /// Log directory to prune, when file logging and retention are both on
    pub fn log_retention(&self) -> Option<(&str, u64)> {
        match (&self.log_dir, self.log_retention_days) {
            (Some(dir), days) if days > 0 => Some((dir.as_str(), days)),
            _ => None,
        }
    }

    /// Create the working directory layout if missing
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        if let Some(dir) = &self.log_dir {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_path_under_work_dir() {
        let mut config = Config::with_work_dir("/tmp/ledger");
        config.db_file = "test.redb".to_string();
        assert_eq!(config.db_path(), PathBuf::from("/tmp/ledger/database/test.redb"));
    }

    #[test]
    fn test_unset_variable_uses_default() {
        assert_eq!(env_or("YARD_LEDGER_SURELY_UNSET_VAR", 42u64), 42);
    }

    #[test]
    fn test_log_retention_needs_dir_and_days() {
        let mut config = Config::with_work_dir("/tmp/ledger");
        config.log_dir = None;
        config.log_retention_days = 30;
        assert_eq!(config.log_retention(), None);

        config.log_dir = Some("/tmp/ledger/logs".to_string());
        assert_eq!(config.log_retention(), Some(("/tmp/ledger/logs", 30)));

        config.log_retention_days = 0;
        assert_eq!(config.log_retention(), None);
    }

    #[test]
    fn test_work_dir_structure_created() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::with_work_dir(dir.path().to_string_lossy());
        config.log_dir = Some(dir.path().join("logs").to_string_lossy().into_owned());

        config.ensure_work_dir_structure().unwrap();
        assert!(config.database_dir().is_dir());
        assert!(dir.path().join("logs").is_dir());
    }
}

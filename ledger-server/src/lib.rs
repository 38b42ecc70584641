//! Yard Ledger Server - auto-parts order reconciliation
//!
//! # Overview
//!
//! Sales agents source parts from salvage yards for customer orders. Each
//! order carries an ordered list of yard assignments; this crate turns those
//! into money: per-yard cost breakdowns, the order's actual gross profit,
//! store-credit balances and the accounting reports.
//!
//! # Module layout
//!
//! ```text
//! ledger-server/src/
//! ├── core/          # Config, background tasks
//! ├── reconcile/     # Pure engine: shipping, yard ledger, GP, store credit, reports
//! ├── orders/        # redb storage, OrdersManager, recompute worker
//! └── utils/         # Logging
//! ```

pub mod core;
pub mod orders;
pub mod reconcile;
pub mod utils;

// Re-export public types
pub use crate::core::{BackgroundTasks, Config, TaskKind};
pub use orders::{OrderStorage, OrdersManager, RecomputeHandle, RecomputeWorker};
pub use reconcile::{ReconcileError, ReportsSnapshot, StoreCreditLedger, YardLedger};

// Re-export unified error types from shared
pub use shared::error::{AppError, AppResult, ErrorCode};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file, run_log_cleanup};

/// Load `.env`, read the config, prepare the work dir and start logging
pub fn setup_environment() -> anyhow::Result<Config> {
    // A missing .env file is normal outside development
    let dotenv_result = dotenv::dotenv();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;
    init_logger_with_file(
        Some(&config.log_level),
        Some(config.log_json),
        config.log_dir.as_deref(),
    );

    if let Ok(path) = dotenv_result {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }
    tracing::info!(work_dir = %config.work_dir, db = %config.db_path().display(), "Environment ready");
    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
 __   __            _   _              _
 \ \ / /_ _ _ _ __| | | |   ___ __| |__ _ ___ _ _
  \ V / _` | '_/ _` | | |__/ -_) _` / _` / -_) '_|
   |_|\__,_|_| \__,_| |____\___\__,_\__, \___|_|
                                    |___/
    "#
    );
}

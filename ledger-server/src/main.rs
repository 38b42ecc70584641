use ledger_server::orders::{RecomputeWorker, run_event_listener, run_periodic_sweep};
use ledger_server::utils::logger::LOG_CLEANUP_INTERVAL;
use ledger_server::{
    BackgroundTasks, OrdersManager, TaskKind, print_banner, run_log_cleanup, setup_environment,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (dotenv, work dir, logging)
    let config = setup_environment()?;
    print_banner();
    tracing::info!("Yard ledger starting...");

    // 2. Open the ledger
    let manager = Arc::new(OrdersManager::new(
        config.db_path(),
        config.event_channel_capacity,
    )?);

    // 3. Repair any GP drift left by a previous run or an external writer
    if config.recompute_on_startup {
        let startup = Arc::clone(&manager);
        tokio::task::spawn_blocking(move || startup.recompute_all()).await??;
    }

    // 4. Background tasks
    let mut tasks = BackgroundTasks::new();
    let (recompute, worker) = RecomputeWorker::new(
        Arc::clone(&manager),
        config.recompute_queue_capacity,
        tasks.shutdown_token(),
    );
    tasks.spawn("recompute_worker", TaskKind::Worker, worker.run());
    tasks.spawn(
        "event_listener",
        TaskKind::Listener,
        run_event_listener(Arc::clone(&manager), manager.subscribe(), tasks.shutdown_token()),
    );
    if config.recompute_interval_secs > 0 {
        tasks.spawn(
            "gp_sweep",
            TaskKind::Periodic,
            run_periodic_sweep(
                Arc::clone(&manager),
                Duration::from_secs(config.recompute_interval_secs),
                tasks.shutdown_token(),
            ),
        );
    }
    if let Some((log_dir, days)) = config.log_retention() {
        tasks.spawn(
            "log_cleanup",
            TaskKind::Periodic,
            run_log_cleanup(
                log_dir.to_string(),
                days,
                LOG_CLEANUP_INTERVAL,
                tasks.shutdown_token(),
            ),
        );
    }
    tasks.log_summary();

    let order_count = manager.storage().order_count()?;
    tracing::info!(epoch = %manager.epoch(), order_count, "Yard ledger ready");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    drop(recompute);
    tasks.check_health();
    tasks
        .shutdown(Duration::from_millis(config.shutdown_timeout_ms))
        .await;
    Ok(())
}

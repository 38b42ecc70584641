//! Recompute Worker - background GP upkeep
//!
//! Hosts enqueue order numbers whose GP may be stale (after an import, an
//! out-of-band edit, or a missed event). Requests are coalesced per batch and
//! each order is recomputed through [`OrdersManager::recompute_gp`], which only
//! writes when the value moved.
//!
//! redb calls are synchronous, so each recompute runs on the blocking pool.

use super::manager::{GpOutcome, OrdersManager};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

/// Upper bound on requests drained into one batch
const MAX_BATCH: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecomputeRequest {
    pub order_no: String,
}

/// Cheap, cloneable sender side of the recompute queue
#[derive(Debug, Clone)]
pub struct RecomputeHandle {
    tx: mpsc::Sender<RecomputeRequest>,
}

impl RecomputeHandle {
    /// Enqueue without waiting; returns false when the queue is full or closed
    ///
    /// A dropped request is harmless: the periodic sweep or the next
    /// mutation corrects the GP.
    pub fn request(&self, order_no: impl Into<String>) -> bool {
        let request = RecomputeRequest {
            order_no: order_no.into(),
        };
        match self.tx.try_send(request) {
            Ok(()) => true,
            Err(TrySendError::Full(req)) => {
                tracing::warn!(order_no = %req.order_no, "Recompute queue full, request dropped");
                false
            }
            Err(TrySendError::Closed(req)) => {
                tracing::debug!(order_no = %req.order_no, "Recompute worker stopped, request dropped");
                false
            }
        }
    }
}

pub struct RecomputeWorker {
    manager: Arc<OrdersManager>,
    rx: mpsc::Receiver<RecomputeRequest>,
    shutdown: CancellationToken,
}

impl RecomputeWorker {
    /// Create the worker and its handle
    pub fn new(
        manager: Arc<OrdersManager>,
        capacity: usize,
        shutdown: CancellationToken,
    ) -> (RecomputeHandle, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            RecomputeHandle { tx },
            Self {
                manager,
                rx,
                shutdown,
            },
        )
    }

    /// Run until shutdown is requested or every handle is dropped
    pub async fn run(mut self) {
        tracing::info!("RecomputeWorker started");

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("RecomputeWorker shutting down");
                    break;
                }
                request = self.rx.recv() => {
                    let Some(first) = request else {
                        tracing::info!("Recompute channel closed, shutting down RecomputeWorker");
                        break;
                    };
                    let batch = self.drain_batch(first);
                    self.process_batch(batch).await;
                }
            }
        }

        tracing::info!("RecomputeWorker stopped");
    }

    /// Coalesce whatever is already queued behind `first`
    fn drain_batch(&mut self, first: RecomputeRequest) -> BTreeSet<String> {
        let mut batch = BTreeSet::from([first.order_no]);
        while batch.len() < MAX_BATCH {
            match self.rx.try_recv() {
                Ok(req) => {
                    batch.insert(req.order_no);
                }
                Err(_) => break,
            }
        }
        batch
    }

    async fn process_batch(&self, batch: BTreeSet<String>) {
        tracing::debug!(count = batch.len(), "Processing recompute batch");
        for order_no in batch {
            let manager = Arc::clone(&self.manager);
            let task_order_no = order_no.clone();
            let result =
                tokio::task::spawn_blocking(move || manager.recompute_gp(&task_order_no)).await;
            match result {
                Ok(Ok(GpOutcome::Updated { old, new })) => {
                    tracing::info!(order_no = %order_no, old, new, "Queued GP recompute applied");
                }
                Ok(Ok(GpOutcome::Unchanged(_))) => {}
                Ok(Err(e)) => {
                    tracing::warn!(order_no = %order_no, error = %e, "Queued GP recompute failed");
                }
                Err(e) => {
                    tracing::error!(order_no = %order_no, error = %e, "Recompute task join failed");
                }
            }
        }
    }
}

/// Full recompute every `interval` until shutdown
///
/// The first tick is skipped; a startup pass is run separately when enabled.
pub async fn run_periodic_sweep(
    manager: Arc<OrdersManager>,
    interval: Duration,
    shutdown: CancellationToken,
) {
    tracing::info!(interval_secs = interval.as_secs(), "GP sweep scheduler started");
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("GP sweep scheduler shutting down");
                break;
            }
            _ = ticker.tick() => {
                let manager = Arc::clone(&manager);
                match tokio::task::spawn_blocking(move || manager.recompute_all()).await {
                    Ok(Ok(_summary)) => {}
                    Ok(Err(e)) => tracing::error!(error = %e, "GP sweep failed"),
                    Err(e) => tracing::error!(error = %e, "GP sweep task join failed"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::manager::DEFAULT_EVENT_CHANNEL_CAPACITY;
    use crate::orders::storage::OrderStorage;
    use shared::order::{NewOrder, OrderStatus};

    fn manager_with_drifted_order(order_no: &str) -> Arc<OrdersManager> {
        let storage = OrderStorage::open_in_memory().unwrap();
        let manager = OrdersManager::with_storage(storage, DEFAULT_EVENT_CHANNEL_CAPACITY);
        let mut order = manager
            .create_order(NewOrder {
                order_no: order_no.to_string(),
                order_status: OrderStatus::OrderCancelled,
                sold_price: 300.0,
                sales_tax: 10.0,
            })
            .unwrap();

        order.actual_gp = 0.0;
        let txn = manager.storage().begin_write().unwrap();
        manager.storage().store_order(&txn, &order).unwrap();
        txn.commit().unwrap();
        Arc::new(manager)
    }

    #[tokio::test]
    async fn test_queued_requests_are_applied() {
        let manager = manager_with_drifted_order("A-1");
        let (handle, worker) =
            RecomputeWorker::new(Arc::clone(&manager), 8, CancellationToken::new());

        assert!(handle.request("A-1"));
        assert!(handle.request("A-1"));
        assert!(handle.request("missing"));
        drop(handle);
        worker.run().await;

        let order = manager.get_order("A-1").unwrap().unwrap();
        assert_eq!(order.actual_gp, 290.0);
        assert_eq!(order.version, 2);
    }

    #[tokio::test]
    async fn test_full_queue_drops_request() {
        let manager = manager_with_drifted_order("A-1");
        let (handle, _worker) = RecomputeWorker::new(manager, 1, CancellationToken::new());

        assert!(handle.request("A-1"));
        assert!(!handle.request("A-1"));
    }

    #[tokio::test]
    async fn test_shutdown_stops_worker() {
        let manager = manager_with_drifted_order("A-1");
        let shutdown = CancellationToken::new();
        let (_handle, worker) = RecomputeWorker::new(manager, 8, shutdown.clone());

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), worker.run())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_periodic_sweep_repairs_drift() {
        let manager = manager_with_drifted_order("A-1");
        let shutdown = CancellationToken::new();
        let sweep = tokio::spawn(run_periodic_sweep(
            Arc::clone(&manager),
            Duration::from_millis(20),
            shutdown.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(200)).await;
        shutdown.cancel();
        sweep.await.unwrap();

        assert_eq!(manager.get_order("A-1").unwrap().unwrap().actual_gp, 290.0);
    }
}

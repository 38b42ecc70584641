//! Order persistence and mutation
//!
//! - **storage**: redb tables holding order documents
//! - **manager**: `OrdersManager`, the single writer path; recomputes GP on every change
//! - **recompute_worker**: queued and periodic GP upkeep
//! - **event_listener**: broadcast subscriber with lag recovery
//!
//! # Data Flow
//!
//! ```text
//! Mutation → OrdersManager ─┬─ validate (reconcile)
//!                           ├─ recompute actual_gp
//!                           ├─ persist (redb write txn)
//!                           └─ broadcast LedgerEvent
//! ```

pub mod event_listener;
pub mod manager;
pub mod recompute_worker;
pub mod storage;

// Re-exports
pub use event_listener::run_event_listener;
pub use manager::{GpOutcome, ManagerError, ManagerResult, OrdersManager, RecomputeSummary};
pub use recompute_worker::{RecomputeHandle, RecomputeRequest, RecomputeWorker, run_periodic_sweep};
pub use storage::{OrderStorage, StorageError};

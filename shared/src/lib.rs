//! Shared types for the yard ledger
//!
//! Order documents, shipping shapes, mutation payloads, ledger events and the
//! unified error codes used by the reconciliation engine and its hosts.

pub mod error;
pub mod order;
pub mod serde_util;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCode};
pub use order::{Order, OrderStatus, YardAssignment};

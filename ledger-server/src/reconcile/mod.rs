//! Reconciliation engine
//!
//! Pure functions over order documents: shipping resolution, yard totals,
//! actual GP, the store-credit ledger and report aggregation. Nothing in here
//! touches storage; the orders manager drives it inside write transactions.

pub mod error;
pub mod gp;
pub mod money;
pub mod reports;
pub mod shipping;
pub mod store_credit;
pub mod warning;
pub mod yard_ledger;

pub use error::{ReconcileError, ReconcileResult};
pub use gp::GpBranch;
pub use reports::{Report, ReportsSnapshot};
pub use store_credit::{AppliedUsage, StoreCreditLedger, YardCreditSummary};
pub use warning::{DataQualityWarning, WarningKind};
pub use yard_ledger::{predicates, LedgerTotals, YardLedger, YardLine};

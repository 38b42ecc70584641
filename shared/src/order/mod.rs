//! Order domain types
//!
//! This module provides the persisted shapes the reconciliation engine reads:
//! - Documents: orders and their ordered yard assignments
//! - Shipping: the structured shipping value plus its legacy forms
//! - Commands: mutation payloads accepted by the orders manager
//! - Events: notifications published after a mutation commits

pub mod command;
pub mod document;
pub mod event;
pub mod shipping;
pub mod yard;

// Re-exports
pub use command::{
    NewOrder, NewYard, ShippingPatch, StoreCreditUsageRequest, UsageKind, UsageType, YardPatch,
    YardRef,
};
pub use document::{Order, OrderStatus};
pub use event::{LedgerEvent, LedgerEventKind, LedgerEventType};
pub use shipping::{RawAmount, ShippingCost, ShippingFields, ShippingKind, ShippingSpec};
pub use yard::{Escalation, EscalationProcess, PART_DELIVERED, PaymentStatus, StoreCreditUsage, YardAssignment};

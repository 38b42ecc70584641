//! Ledger events - "something changed" notifications published after commit
//!
//! Hosts relay these to interested views over whatever transport they run.
//! Events are hints: a missed event is corrected by the next recompute.

use super::document::OrderStatus;
use serde::{Deserialize, Serialize};

/// Ledger event - published after a mutation commits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEvent {
    /// Event unique ID
    pub event_id: String,
    /// Order this event belongs to
    pub order_no: String,
    /// Order version after the change
    pub version: u64,
    /// Server timestamp (Unix milliseconds)
    pub timestamp: i64,
    pub kind: LedgerEventKind,
}

impl LedgerEvent {
    pub fn new(order_no: impl Into<String>, version: u64, kind: LedgerEventKind) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            order_no: order_no.into(),
            version,
            timestamp: crate::util::now_millis(),
            kind,
        }
    }

    pub fn event_type(&self) -> LedgerEventType {
        self.kind.event_type()
    }
}

/// Event type enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEventType {
    OrderCreated,
    YardAdded,
    YardUpdated,
    StatusChanged,
    CustomerRefundChanged,
    StoreCreditUsed,
    GpUpdated,
}

impl std::fmt::Display for LedgerEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerEventType::OrderCreated => write!(f, "ORDER_CREATED"),
            LedgerEventType::YardAdded => write!(f, "YARD_ADDED"),
            LedgerEventType::YardUpdated => write!(f, "YARD_UPDATED"),
            LedgerEventType::StatusChanged => write!(f, "STATUS_CHANGED"),
            LedgerEventType::CustomerRefundChanged => write!(f, "CUSTOMER_REFUND_CHANGED"),
            LedgerEventType::StoreCreditUsed => write!(f, "STORE_CREDIT_USED"),
            LedgerEventType::GpUpdated => write!(f, "GP_UPDATED"),
        }
    }
}

/// Event payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEventKind {
    OrderCreated,
    YardAdded {
        yard_id: u32,
        index: usize,
    },
    YardUpdated {
        yard_id: u32,
        index: usize,
    },
    StatusChanged {
        from: OrderStatus,
        to: OrderStatus,
    },
    CustomerRefundChanged {
        amount: f64,
    },
    /// Published on the grant's source order
    StoreCreditUsed {
        grant_index: usize,
        amount: f64,
        target_order_no: String,
        remaining: f64,
    },
    /// Only published when the value moved beyond tolerance
    GpUpdated {
        old: f64,
        new: f64,
    },
}

impl LedgerEventKind {
    pub fn event_type(&self) -> LedgerEventType {
        match self {
            LedgerEventKind::OrderCreated => LedgerEventType::OrderCreated,
            LedgerEventKind::YardAdded { .. } => LedgerEventType::YardAdded,
            LedgerEventKind::YardUpdated { .. } => LedgerEventType::YardUpdated,
            LedgerEventKind::StatusChanged { .. } => LedgerEventType::StatusChanged,
            LedgerEventKind::CustomerRefundChanged { .. } => LedgerEventType::CustomerRefundChanged,
            LedgerEventKind::StoreCreditUsed { .. } => LedgerEventType::StoreCreditUsed,
            LedgerEventKind::GpUpdated { .. } => LedgerEventType::GpUpdated,
        }
    }
}

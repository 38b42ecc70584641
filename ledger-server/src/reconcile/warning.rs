//! Non-fatal data-quality findings
//!
//! The engine computes with best-effort defaults and reports these alongside
//! its results so the host can flag the offending record.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Both own and yard shipping set on a stored record; shipping counted as 0
    ShippingConflict,
    /// Shipping text could not be parsed; counted as 0
    UnparsedShipping,
    /// A stored money field held non-numeric text; counted as 0
    UnparsedAmount,
    /// A stored amount was negative; counted as 0
    NegativeAmount,
    /// Refunded amount exceeds the assignment's gross cost; kept as-is
    RefundExceedsCost,
    /// Usage entries exceed a grant's issued credit
    OverdrawnCredit,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataQualityWarning {
    pub order_no: String,
    /// Index of the yard assignment the finding is about
    pub yard_index: usize,
    pub kind: WarningKind,
    pub message: String,
}

impl DataQualityWarning {
    pub fn new(
        order_no: impl Into<String>,
        yard_index: usize,
        kind: WarningKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            order_no: order_no.into(),
            yard_index,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "order {} yard #{}: {}",
            self.order_no, self.yard_index, self.message
        )
    }
}

//! Error category classification

use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// - 0xxx: General errors
/// - 4xxx: Order errors
/// - 5xxx: Yard / shipping errors
/// - 6xxx: Store credit errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Order errors (4xxx)
    Order,
    /// Yard assignment errors (5xxx)
    Yard,
    /// Store credit errors (6xxx)
    StoreCredit,
    /// System errors (9xxx and anything unassigned)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            4000..5000 => Self::Order,
            5000..6000 => Self::Yard,
            6000..7000 => Self::StoreCredit,
            _ => Self::System,
        }
    }

    /// Whether errors in this category are caller mistakes rather than faults
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::System)
    }
}

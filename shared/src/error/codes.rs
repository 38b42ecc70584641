//! Unified error codes for the yard ledger
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 5xxx: Yard / shipping errors
//! - 6xxx: Store credit errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility with the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,
    /// Monetary input is negative, non-finite or non-numeric
    InvalidAmount = 9,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order number already in use
    OrderAlreadyExists = 4002,
    /// Order was modified since the caller read it
    OrderVersionConflict = 4003,

    // ==================== 5xxx: Yard ====================
    /// Yard assignment not found
    YardNotFound = 5001,
    /// Both own and yard shipping are set
    ShippingConflict = 5002,
    /// Index no longer addresses the expected yard assignment
    StaleIndex = 5003,
    /// A new yard cannot be added while an active one exists
    YardAddNotAllowed = 5004,

    // ==================== 6xxx: Store credit ====================
    /// Store credit grant not found
    StoreCreditNotFound = 6001,
    /// Usage exceeds the grant's remaining balance
    InsufficientCredit = 6002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Serialization error
    SerializationError = 9003,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Default English message for the code
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidAmount => "Invalid amount",

            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyExists => "Order number already exists",
            ErrorCode::OrderVersionConflict => "Order was modified concurrently, reload and retry",

            ErrorCode::YardNotFound => "Yard assignment not found",
            ErrorCode::ShippingConflict => "Only one of own shipping or yard shipping may be set",
            ErrorCode::StaleIndex => "Yard index is stale, reload and retry",
            ErrorCode::YardAddNotAllowed => {
                "A new yard can only be added once existing yards are PO cancelled or escalated"
            }

            ErrorCode::StoreCreditNotFound => "Store credit not found",
            ErrorCode::InsufficientCredit => "Insufficient store credit",

            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::SerializationError => "Serialization error",
        }
    }

    /// Get the error category
    pub fn category(&self) -> super::ErrorCategory {
        super::ErrorCategory::from_code(self.code())
    }

    /// Whether the host may retry the same request after reloading data
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCode::StaleIndex | ErrorCode::OrderVersionConflict | ErrorCode::DatabaseError
        )
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code as u16
    }
}

/// Error returned when converting an unknown u16 into [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            5 => Ok(ErrorCode::InvalidRequest),
            9 => Ok(ErrorCode::InvalidAmount),

            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderAlreadyExists),
            4003 => Ok(ErrorCode::OrderVersionConflict),

            5001 => Ok(ErrorCode::YardNotFound),
            5002 => Ok(ErrorCode::ShippingConflict),
            5003 => Ok(ErrorCode::StaleIndex),
            5004 => Ok(ErrorCode::YardAddNotAllowed),

            6001 => Ok(ErrorCode::StoreCreditNotFound),
            6002 => Ok(ErrorCode::InsufficientCredit),

            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::SerializationError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

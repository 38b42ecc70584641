//! Unified error system for the yard ledger
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 5xxx: Yard / shipping errors
//! - 6xxx: Store credit errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::invalid_amount("part_price", "part_price must be non-negative")
//!     .with_detail("value", -5.0);
//! assert_eq!(err.code, ErrorCode::InvalidAmount);
//! assert_eq!(err.http_status(), http::StatusCode::UNPROCESSABLE_ENTITY);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};

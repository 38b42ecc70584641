//! HTTP status code mapping for error codes
//!
//! The ledger does not serve HTTP itself; hosts use this mapping when they
//! surface an [`AppError`](super::AppError) through their own routes.

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::NotFound | Self::OrderNotFound | Self::YardNotFound | Self::StoreCreditNotFound => {
                StatusCode::NOT_FOUND
            }

            Self::OrderAlreadyExists | Self::OrderVersionConflict | Self::StaleIndex => {
                StatusCode::CONFLICT
            }

            Self::ValidationFailed
            | Self::InvalidAmount
            | Self::ShippingConflict
            | Self::YardAddNotAllowed
            | Self::InsufficientCredit => StatusCode::UNPROCESSABLE_ENTITY,

            Self::InvalidRequest => StatusCode::BAD_REQUEST,

            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::SerializationError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Validation failures raised by the reconciliation engine
///
/// These abort the specific mutation and never partially apply.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReconcileError {
    #[error("Shipping conflict: own shipping ({own}) and yard shipping ({yard}) are both set")]
    ShippingConflict { own: String, yard: String },

    #[error("Invalid amount for {field}: {reason}")]
    InvalidAmount { field: &'static str, reason: String },

    #[error("Insufficient store credit: requested {requested}, remaining {remaining}")]
    InsufficientCredit { requested: f64, remaining: f64 },

    #[error("Store credit grant not found: order {order_no}, index {index}")]
    GrantNotFound { order_no: String, index: usize },

    #[error("Yard assignment not found: order {order_no}, {reference}")]
    YardNotFound { order_no: String, reference: String },

    #[error("Stale index {index}: expected yard {expected_id}, found {found_id}")]
    StaleIndex {
        index: usize,
        expected_id: u32,
        found_id: u32,
    },
}

pub type ReconcileResult<T> = Result<T, ReconcileError>;

impl ReconcileError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ReconcileError::ShippingConflict { .. } => ErrorCode::ShippingConflict,
            ReconcileError::InvalidAmount { .. } => ErrorCode::InvalidAmount,
            ReconcileError::InsufficientCredit { .. } => ErrorCode::InsufficientCredit,
            ReconcileError::GrantNotFound { .. } => ErrorCode::StoreCreditNotFound,
            ReconcileError::YardNotFound { .. } => ErrorCode::YardNotFound,
            ReconcileError::StaleIndex { .. } => ErrorCode::StaleIndex,
        }
    }
}

impl From<ReconcileError> for AppError {
    fn from(err: ReconcileError) -> Self {
        let code = err.code();
        let message = err.to_string();
        let app = AppError::with_message(code, message);
        match err {
            ReconcileError::ShippingConflict { own, yard } => app
                .with_detail("own_shipping", own)
                .with_detail("yard_shipping", yard),
            ReconcileError::InvalidAmount { field, .. } => app.with_detail("field", field),
            ReconcileError::InsufficientCredit {
                requested,
                remaining,
            } => app
                .with_detail("requested", requested)
                .with_detail("remaining", remaining),
            ReconcileError::GrantNotFound { order_no, index } => app
                .with_detail("order_no", order_no)
                .with_detail("grant_index", index),
            ReconcileError::YardNotFound { order_no, .. } => app.with_detail("order_no", order_no),
            ReconcileError::StaleIndex {
                index,
                expected_id,
                found_id,
            } => app
                .with_detail("index", index)
                .with_detail("expected_id", expected_id)
                .with_detail("found_id", found_id),
        }
    }
}

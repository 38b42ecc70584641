use super::super::storage::StorageError;
use crate::reconcile::ReconcileError;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order already exists: {0}")]
    OrderAlreadyExists(String),

    #[error("Order {order_no} version conflict: expected {expected}, found {actual}")]
    VersionConflict {
        order_no: String,
        expected: u64,
        actual: u64,
    },

    #[error("Cannot add a yard to {0}: an existing yard is still active")]
    YardAddNotAllowed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Map a storage failure onto an error code
fn classify_storage_error(e: &StorageError) -> ErrorCode {
    match e {
        StorageError::Serialization(_) => ErrorCode::SerializationError,
        _ => ErrorCode::DatabaseError,
    }
}

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::Storage(e) => {
                let code = classify_storage_error(&e);
                tracing::error!(error = %e, error_code = %code, "Storage error occurred");
                AppError::with_message(code, e.to_string())
            }
            ManagerError::Reconcile(e) => e.into(),
            ManagerError::OrderNotFound(order_no) => AppError::with_message(
                ErrorCode::OrderNotFound,
                format!("Order not found: {}", order_no),
            )
            .with_detail("order_no", order_no),
            ManagerError::OrderAlreadyExists(order_no) => AppError::with_message(
                ErrorCode::OrderAlreadyExists,
                format!("Order already exists: {}", order_no),
            )
            .with_detail("order_no", order_no),
            ManagerError::VersionConflict {
                order_no,
                expected,
                actual,
            } => AppError::with_message(
                ErrorCode::OrderVersionConflict,
                format!(
                    "Order {} version conflict: expected {}, found {}",
                    order_no, expected, actual
                ),
            )
            .with_detail("order_no", order_no)
            .with_detail("expected", expected)
            .with_detail("actual", actual),
            err @ ManagerError::YardAddNotAllowed(_) => {
                AppError::with_message(ErrorCode::YardAddNotAllowed, err.to_string())
            }
            ManagerError::InvalidRequest(msg) => {
                AppError::with_message(ErrorCode::InvalidRequest, msg)
            }
        }
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;

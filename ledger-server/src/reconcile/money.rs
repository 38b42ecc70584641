//! Money calculation utilities using rust_decimal for precision
//!
//! Documents store monetary values as `f64`. Every sum and difference in the
//! engine is done in `Decimal`, then rounded to 2 decimal places (half away
//! from zero) on the way back out.

use super::error::ReconcileError;
use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum accepted value for any single monetary input (1,000,000)
const MAX_AMOUNT: f64 = 1_000_000.0;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round(value).to_f64().unwrap_or_default()
}

/// Round to 2 decimal places, half away from zero
#[inline]
pub fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Whether two stored amounts differ by less than [`MONEY_TOLERANCE`]
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (to_decimal(a) - to_decimal(b)).abs() < MONEY_TOLERANCE
}

/// Sum of stored amounts
pub fn sum<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = f64>,
{
    values.into_iter().map(to_decimal).sum()
}

/// Validate a monetary input at the mutation boundary: finite, non-negative, bounded
pub fn validate_amount(value: f64, field: &'static str) -> Result<f64, ReconcileError> {
    if !value.is_finite() {
        return Err(ReconcileError::InvalidAmount {
            field,
            reason: format!("must be a finite number, got {}", value),
        });
    }
    if value < 0.0 {
        return Err(ReconcileError::InvalidAmount {
            field,
            reason: format!("must be non-negative, got {}", value),
        });
    }
    if value > MAX_AMOUNT {
        return Err(ReconcileError::InvalidAmount {
            field,
            reason: format!("exceeds maximum allowed ({}), got {}", MAX_AMOUNT, value),
        });
    }
    Ok(value)
}

/// Like [`validate_amount`] but also rejects zero
pub fn validate_positive(value: f64, field: &'static str) -> Result<f64, ReconcileError> {
    let value = validate_amount(value, field)?;
    if value == 0.0 {
        return Err(ReconcileError::InvalidAmount {
            field,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}

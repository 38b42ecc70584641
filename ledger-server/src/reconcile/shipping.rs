//! Shipping cost resolver
//!
//! Normalizes whatever shipping value a yard assignment carries into a single
//! [`ShippingCost`]. Own and yard shipping are mutually exclusive: two set
//! values are a [`ReconcileError::ShippingConflict`], never silently resolved.
//!
//! Parsing is tolerant once the type is known: text that is not a number
//! yields amount 0 with `parse_failed` set, so stored records always resolve.
//! [`from_fields`] is the strict entry-boundary variant used by edits.

use super::error::{ReconcileError, ReconcileResult};
use super::money::validate_amount;
use shared::order::{RawAmount, ShippingCost, ShippingKind, ShippingSpec, YardAssignment};
use shared::serde_util::lenient_money;

const OWN_PREFIX: &str = "own shipping";
const YARD_PREFIX: &str = "yard shipping";

/// Resolved shipping plus whether any amount text failed to parse
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub cost: ShippingCost,
    pub parse_failed: bool,
}

impl Resolution {
    fn clean(cost: ShippingCost) -> Self {
        Self {
            cost,
            parse_failed: false,
        }
    }
}

/// Resolve a shipping value to `{type, amount}`
pub fn resolve(spec: &ShippingSpec) -> ReconcileResult<ShippingCost> {
    inspect(spec).map(|r| r.cost)
}

/// Resolve a yard's shipping; absent shipping is `none`
pub fn resolve_yard(yard: &YardAssignment) -> ReconcileResult<Resolution> {
    match &yard.shipping {
        Some(spec) => inspect(spec),
        None => Ok(Resolution::clean(ShippingCost::NONE)),
    }
}

/// Resolve and report parse failures
pub fn inspect(spec: &ShippingSpec) -> ReconcileResult<Resolution> {
    match spec {
        ShippingSpec::Structured(cost) => Ok(Resolution::clean(match cost.kind {
            ShippingKind::None => ShippingCost::NONE,
            _ => *cost,
        })),
        ShippingSpec::Fields(fields) => {
            inspect_fields(fields.own_shipping.as_ref(), fields.yard_shipping.as_ref())
        }
        ShippingSpec::Encoded(text) => Ok(decode(text)),
        ShippingSpec::Unrecognized(_) => Ok(Resolution {
            cost: ShippingCost::NONE,
            parse_failed: true,
        }),
    }
}

fn inspect_fields(
    own: Option<&RawAmount>,
    yard: Option<&RawAmount>,
) -> ReconcileResult<Resolution> {
    let own = own.filter(|v| v.is_set());
    let yard = yard.filter(|v| v.is_set());
    match (own, yard) {
        (Some(own), Some(yard)) => Err(ReconcileError::ShippingConflict {
            own: display_raw(own),
            yard: display_raw(yard),
        }),
        (Some(own), None) => Ok(tolerant(ShippingKind::Own, parse_raw(own))),
        (None, Some(yard)) => Ok(tolerant(ShippingKind::Yard, parse_raw(yard))),
        (None, None) => Ok(Resolution::clean(ShippingCost::NONE)),
    }
}

/// Decode the legacy `"Yard shipping: 42.50"` / `"Own shipping: 12"` form
pub fn decode(text: &str) -> Resolution {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Resolution::clean(ShippingCost::NONE);
    }
    let lower = trimmed.to_ascii_lowercase();
    let (kind, prefix_len) = if lower.starts_with(OWN_PREFIX) {
        (ShippingKind::Own, OWN_PREFIX.len())
    } else if lower.starts_with(YARD_PREFIX) {
        (ShippingKind::Yard, YARD_PREFIX.len())
    } else {
        return Resolution {
            cost: ShippingCost::NONE,
            parse_failed: true,
        };
    };
    // Prefixes are ASCII, so the byte offset is valid in the original string.
    let rest = trimmed[prefix_len..].trim_start().trim_start_matches(':');
    tolerant(kind, lenient_money::parse(rest))
}

/// Strict resolution of raw form fields at the entry boundary
///
/// Rejects conflicts, non-numeric text and negative amounts.
pub fn from_fields(
    own: Option<&RawAmount>,
    yard: Option<&RawAmount>,
) -> ReconcileResult<ShippingCost> {
    let resolution = inspect_fields(own, yard)?;
    if resolution.parse_failed {
        return Err(ReconcileError::InvalidAmount {
            field: "shipping",
            reason: "shipping amount is not a number".to_string(),
        });
    }
    validate_cost(resolution.cost)
}

/// Validate an already-structured cost at the entry boundary
pub fn validate_cost(cost: ShippingCost) -> ReconcileResult<ShippingCost> {
    match cost.kind {
        ShippingKind::None => Ok(ShippingCost::NONE),
        _ => {
            validate_amount(cost.amount, "shipping")?;
            Ok(cost)
        }
    }
}

/// Rewrite any legacy form into the structured form
pub fn normalize(spec: &ShippingSpec) -> ReconcileResult<ShippingSpec> {
    resolve(spec).map(ShippingSpec::Structured)
}

fn tolerant(kind: ShippingKind, amount: Option<f64>) -> Resolution {
    match amount {
        Some(amount) => Resolution::clean(ShippingCost { kind, amount }),
        None => Resolution {
            cost: ShippingCost { kind, amount: 0.0 },
            parse_failed: true,
        },
    }
}

fn parse_raw(raw: &RawAmount) -> Option<f64> {
    match raw {
        RawAmount::Number(n) if n.is_finite() => Some(*n),
        RawAmount::Number(_) => None,
        RawAmount::Text(s) => lenient_money::parse(s),
    }
}

fn display_raw(raw: &RawAmount) -> String {
    match raw {
        RawAmount::Number(n) => n.to_string(),
        RawAmount::Text(s) => s.trim().to_string(),
    }
}

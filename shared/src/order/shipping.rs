//! Shipping cost shapes
//!
//! New edits always persist [`ShippingSpec::Structured`]. The two legacy forms
//! stay readable so existing documents keep loading.

use crate::serde_util::numeric_money;
use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;

/// Who pays the carrier for a yard assignment
///
/// Serialized lowercase; decoding ignores case and surrounding whitespace.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShippingKind {
    /// Shipping arranged (and billed) by the business itself
    Own,
    /// Shipping charged by the yard
    Yard,
    /// No shipping cost recorded
    #[default]
    None,
}

impl fmt::Display for ShippingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShippingKind::Own => write!(f, "own"),
            ShippingKind::Yard => write!(f, "yard"),
            ShippingKind::None => write!(f, "none"),
        }
    }
}

impl<'de> Deserialize<'de> for ShippingKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        const VARIANTS: &[&str] = &["own", "yard", "none"];

        let raw = String::deserialize(deserializer)?;
        match raw.trim().to_ascii_lowercase().as_str() {
            "own" => Ok(ShippingKind::Own),
            "yard" => Ok(ShippingKind::Yard),
            "none" => Ok(ShippingKind::None),
            other => Err(de::Error::unknown_variant(other, VARIANTS)),
        }
    }
}

/// Normalized shipping cost: `{ "type": "own"|"yard"|"none", "amount": n }`
///
/// `amount` may be stored as numeric text (`"15"`); non-numeric text fails
/// decoding so [`ShippingSpec`] falls through to [`ShippingSpec::Unrecognized`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ShippingCost {
    #[serde(rename = "type")]
    pub kind: ShippingKind,
    #[serde(default, deserialize_with = "numeric_money::deserialize")]
    pub amount: f64,
}

impl ShippingCost {
    pub const NONE: ShippingCost = ShippingCost {
        kind: ShippingKind::None,
        amount: 0.0,
    };

    pub fn own(amount: f64) -> Self {
        Self {
            kind: ShippingKind::Own,
            amount,
        }
    }

    pub fn yard(amount: f64) -> Self {
        Self {
            kind: ShippingKind::Yard,
            amount,
        }
    }

    pub fn is_yard(&self) -> bool {
        self.kind == ShippingKind::Yard
    }

    pub fn is_own(&self) -> bool {
        self.kind == ShippingKind::Own
    }
}

/// A raw amount as typed into the shipping fields (number or free text)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
}

impl RawAmount {
    /// A value counts as set when it is a number or non-blank text
    pub fn is_set(&self) -> bool {
        match self {
            RawAmount::Number(_) => true,
            RawAmount::Text(s) => !s.trim().is_empty(),
        }
    }
}

impl From<f64> for RawAmount {
    fn from(value: f64) -> Self {
        RawAmount::Number(value)
    }
}

impl From<&str> for RawAmount {
    fn from(value: &str) -> Self {
        RawAmount::Text(value.to_string())
    }
}

/// Legacy two-field shipping form: `{ "ownShipping": .., "yardShipping": .. }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ShippingFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub own_shipping: Option<RawAmount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yard_shipping: Option<RawAmount>,
}

impl ShippingFields {
    pub fn new(own_shipping: Option<RawAmount>, yard_shipping: Option<RawAmount>) -> Self {
        Self {
            own_shipping,
            yard_shipping,
        }
    }
}

/// Shipping value as persisted on a yard assignment
///
/// Variant order matters for untagged decoding: the structured form is tried
/// first because it is the only one carrying a `type` key, and
/// [`ShippingSpec::Unrecognized`] must stay last.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ShippingSpec {
    /// Canonical `{type, amount}` value
    Structured(ShippingCost),
    /// Legacy two-field form
    Fields(ShippingFields),
    /// Legacy encoded string, e.g. `"Yard shipping: 42.50"`
    Encoded(String),
    /// Any other stored value, kept verbatim; resolves to `none` with a parse failure
    Unrecognized(serde_json::Value),
}

impl From<ShippingCost> for ShippingSpec {
    fn from(cost: ShippingCost) -> Self {
        ShippingSpec::Structured(cost)
    }
}

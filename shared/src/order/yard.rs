//! Yard assignment - one supplier engagement on an order

use super::shipping::ShippingSpec;
use crate::serde_util::{lenient_money, lenient_money_opt};
use serde::{Deserialize, Serialize};

/// Money fields of a stored assignment as (document key, field name)
const MONEY_FIELDS: [(&str, &str); 6] = [
    ("partPrice", "part_price"),
    ("otherCharges", "other_charges"),
    ("reimbursementAmount", "reimbursement_amount"),
    ("refundedAmount", "refunded_amount"),
    ("refundToCollect", "refund_to_collect"),
    ("storeCredit", "store_credit"),
];

/// Literal yard status marking a completed delivery
pub const PART_DELIVERED: &str = "Part delivered";

/// Whether the customer's card has been billed for this yard's cost
///
/// Stored as a free string upstream; only `"Card charged"` is meaningful,
/// every other value (including absence) reads as [`PaymentStatus::NotCharged`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum PaymentStatus {
    #[default]
    NotCharged,
    CardCharged,
}

impl PaymentStatus {
    pub const CARD_CHARGED: &'static str = "Card charged";

    pub fn is_card_charged(&self) -> bool {
        matches!(self, PaymentStatus::CardCharged)
    }
}

impl From<Option<String>> for PaymentStatus {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(s) if s.trim().eq_ignore_ascii_case(Self::CARD_CHARGED) => {
                PaymentStatus::CardCharged
            }
            _ => PaymentStatus::NotCharged,
        }
    }
}

impl From<PaymentStatus> for Option<String> {
    fn from(value: PaymentStatus) -> Self {
        match value {
            PaymentStatus::CardCharged => Some(PaymentStatus::CARD_CHARGED.to_string()),
            PaymentStatus::NotCharged => None,
        }
    }
}

/// Exception workflow chosen for an escalated yard
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EscalationProcess {
    Replacement,
    Return,
    Junk,
}

/// Escalation sub-state (informational)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Escalation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process: Option<EscalationProcess>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Unix millis
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opened_at: Option<i64>,
}

/// One draw against a store-credit grant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreCreditUsage {
    /// Order the credit was spent on
    pub order_no: String,
    #[serde(deserialize_with = "lenient_money::deserialize")]
    pub amount: f64,
    /// Unix millis, absent on legacy entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_at: Option<i64>,
}

/// A single yard (supplier) engagement on an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct YardAssignment {
    /// Stable id within the order, assigned at append and never reused.
    /// Legacy documents load with 0 and are renumbered by [`super::Order::ensure_yard_ids`].
    pub id: u32,
    pub yard_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(deserialize_with = "lenient_money::deserialize")]
    pub part_price: f64,
    #[serde(deserialize_with = "lenient_money::deserialize")]
    pub other_charges: f64,
    #[serde(deserialize_with = "lenient_money::deserialize")]
    pub reimbursement_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping: Option<ShippingSpec>,

    pub payment_status: PaymentStatus,
    /// Lifecycle / PO state (free-form)
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalation: Option<Escalation>,

    #[serde(deserialize_with = "lenient_money::deserialize")]
    pub refunded_amount: f64,
    /// "Collect refund" checkbox
    pub collect_refund: bool,
    #[serde(deserialize_with = "lenient_money::deserialize")]
    pub refund_to_collect: f64,

    /// Presence of a positive value makes this assignment a store-credit grant
    #[serde(
        deserialize_with = "lenient_money_opt::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub store_credit: Option<f64>,
    pub store_credit_used_for: Vec<StoreCreditUsage>,

    /// Money fields whose stored text did not parse and was read as 0.
    /// Filled by [`super::Order::from_json_slice`]; never persisted.
    #[serde(skip)]
    pub unparsed_amounts: Vec<&'static str>,
}

impl YardAssignment {
    /// `PO cancelled` / `PO canceled`, any case
    pub fn is_po_cancelled(&self) -> bool {
        let status = self.status.trim();
        status.eq_ignore_ascii_case("PO cancelled") || status.eq_ignore_ascii_case("PO canceled")
    }

    /// Any status mentioning escalation
    pub fn is_escalated(&self) -> bool {
        self.status.to_ascii_lowercase().contains("escalation")
    }

    pub fn is_part_delivered(&self) -> bool {
        self.status.trim() == PART_DELIVERED
    }

    pub fn is_card_charged(&self) -> bool {
        self.payment_status.is_card_charged()
    }

    /// Terminal for the "can add new yard" rule
    pub fn is_closed(&self) -> bool {
        self.is_po_cancelled() || self.is_escalated()
    }

    /// Granted credit when positive
    pub fn credit_granted(&self) -> Option<f64> {
        self.store_credit.filter(|c| c.is_finite() && *c > 0.0)
    }

    pub fn is_credit_grant(&self) -> bool {
        self.credit_granted().is_some()
    }

    /// Record which money fields of the raw stored assignment hold non-numeric text
    pub fn mark_unparsed_amounts(&mut self, raw: &serde_json::Value) {
        self.unparsed_amounts = MONEY_FIELDS
            .iter()
            .filter(|(key, _)| {
                raw.get(key)
                    .and_then(serde_json::Value::as_str)
                    .is_some_and(lenient_money::is_unparsable)
            })
            .map(|(_, field)| *field)
            .collect();
    }

    /// Forget a parse failure once the field has been overwritten
    pub fn clear_unparsed(&mut self, field: &str) {
        self.unparsed_amounts.retain(|f| *f != field);
    }
}

//! Mutation payloads accepted by the orders manager

use super::document::OrderStatus;
use super::shipping::{RawAmount, ShippingCost};
use super::yard::{Escalation, PaymentStatus};
use serde::{Deserialize, Serialize};

/// Create a new order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub order_no: String,
    #[serde(default)]
    pub order_status: OrderStatus,
    pub sold_price: f64,
    #[serde(default)]
    pub sales_tax: f64,
}

/// Append a yard to an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct NewYard {
    pub yard_name: String,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub part_price: f64,
    pub other_charges: f64,
    pub own_shipping: Option<RawAmount>,
    pub yard_shipping: Option<RawAmount>,
    pub payment_status: PaymentStatus,
    pub status: String,
}

/// Shipping edit carried by a [`YardPatch`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ShippingPatch {
    /// Already-normalized value
    Cost(ShippingCost),
    /// Raw form fields; both set is rejected
    Fields {
        #[serde(default, rename = "ownShipping")]
        own_shipping: Option<RawAmount>,
        #[serde(default, rename = "yardShipping")]
        yard_shipping: Option<RawAmount>,
    },
}

/// Partial update of a yard assignment; `None` leaves a field untouched
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct YardPatch {
    pub yard_name: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub part_price: Option<f64>,
    pub other_charges: Option<f64>,
    pub reimbursement_amount: Option<f64>,
    pub shipping: Option<ShippingPatch>,
    pub payment_status: Option<PaymentStatus>,
    pub status: Option<String>,
    pub escalation: Option<Escalation>,
    pub refunded_amount: Option<f64>,
    pub collect_refund: Option<bool>,
    pub refund_to_collect: Option<f64>,
    pub store_credit: Option<f64>,
}

impl YardPatch {
    pub fn is_empty(&self) -> bool {
        *self == YardPatch::default()
    }
}

/// How an edit addresses a yard assignment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "by")]
pub enum YardRef {
    /// Stable id (preferred)
    Id { id: u32 },
    /// Bare positional index (legacy callers)
    Index { index: usize },
    /// Positional index that must still hold the yard with this id
    IndexChecked { index: usize, id: u32 },
}

/// Full or partial draw against a store-credit grant
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UsageType {
    /// Spend whatever remains at the time of the call
    Full,
    /// Spend a caller-supplied amount within `(0, remaining]`
    Partial(f64),
}

/// Wire form of [`UsageType`]'s discriminant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UsageKind {
    Full,
    Partial,
}

/// `useStoreCredit(sourceOrderNo, grantIndex, usageType, amount?, targetOrderNo)`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreCreditUsageRequest {
    pub source_order_no: String,
    pub grant_index: usize,
    pub usage_type: UsageKind,
    /// Required for partial usage, ignored for full usage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    pub target_order_no: String,
}

impl StoreCreditUsageRequest {
    /// A partial request without an amount becomes a zero draw, which the
    /// ledger rejects as an invalid amount.
    pub fn usage(&self) -> UsageType {
        match self.usage_type {
            UsageKind::Full => UsageType::Full,
            UsageKind::Partial => UsageType::Partial(self.amount.unwrap_or(0.0)),
        }
    }
}

//! Order document as persisted by the host application

use super::yard::YardAssignment;
use crate::serde_util::lenient_money;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum OrderStatus {
    #[default]
    Placed,
    #[serde(rename = "Customer Approved")]
    CustomerApproved,
    #[serde(rename = "Yard Processing")]
    YardProcessing,
    #[serde(rename = "In Transit")]
    InTransit,
    Escalation,
    #[serde(rename = "Order Fulfilled")]
    OrderFulfilled,
    #[serde(rename = "Order Cancelled")]
    OrderCancelled,
    Dispute,
    #[serde(rename = "Dispute after Cancellation")]
    DisputeAfterCancellation,
    Refunded,
    Voided,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 11] = [
        OrderStatus::Placed,
        OrderStatus::CustomerApproved,
        OrderStatus::YardProcessing,
        OrderStatus::InTransit,
        OrderStatus::Escalation,
        OrderStatus::OrderFulfilled,
        OrderStatus::OrderCancelled,
        OrderStatus::Dispute,
        OrderStatus::DisputeAfterCancellation,
        OrderStatus::Refunded,
        OrderStatus::Voided,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "Placed",
            OrderStatus::CustomerApproved => "Customer Approved",
            OrderStatus::YardProcessing => "Yard Processing",
            OrderStatus::InTransit => "In Transit",
            OrderStatus::Escalation => "Escalation",
            OrderStatus::OrderFulfilled => "Order Fulfilled",
            OrderStatus::OrderCancelled => "Order Cancelled",
            OrderStatus::Dispute => "Dispute",
            OrderStatus::DisputeAfterCancellation => "Dispute after Cancellation",
            OrderStatus::Refunded => "Refunded",
            OrderStatus::Voided => "Voided",
        }
    }

    /// Order Cancelled / Refunded
    pub fn is_cancellation(&self) -> bool {
        matches!(self, OrderStatus::OrderCancelled | OrderStatus::Refunded)
    }

    /// Dispute / Dispute after Cancellation
    pub fn is_dispute(&self) -> bool {
        matches!(
            self,
            OrderStatus::Dispute | OrderStatus::DisputeAfterCancellation
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Natural key, immutable once created
    pub order_no: String,
    #[serde(default)]
    pub order_status: OrderStatus,
    #[serde(default, deserialize_with = "lenient_money::deserialize")]
    pub sold_price: f64,
    #[serde(default, deserialize_with = "lenient_money::deserialize")]
    pub sales_tax: f64,
    /// Cumulative amount refunded to the customer
    #[serde(default, deserialize_with = "lenient_money::deserialize")]
    pub customer_refund_amount: f64,
    /// Creation order is significant: the index is an addressing key.
    #[serde(default, alias = "additionalInfo")]
    pub yard_assignments: Vec<YardAssignment>,
    /// Derived by the GP calculator; persisted for fast reads
    #[serde(default, rename = "actualGP", deserialize_with = "lenient_money::deserialize")]
    pub actual_gp: f64,
    /// Incremented on every persisted mutation
    #[serde(default)]
    pub version: u64,
    /// Unix millis
    #[serde(default)]
    pub created_at: i64,
    /// Unix millis
    #[serde(default)]
    pub updated_at: i64,
}

impl Order {
    pub fn new(order_no: impl Into<String>, order_status: OrderStatus) -> Self {
        Self {
            order_no: order_no.into(),
            order_status,
            ..Default::default()
        }
    }

    /// A new yard may be appended when none exist yet or every existing one
    /// is PO cancelled or escalated.
    pub fn can_add_yard(&self) -> bool {
        self.yard_assignments.iter().all(YardAssignment::is_closed)
    }

    /// Decode a stored document, recording money text that was read as 0
    ///
    /// Same result as `serde_json::from_slice` plus
    /// [`YardAssignment::unparsed_amounts`] on every assignment.
    pub fn from_json_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        let raw: serde_json::Value = serde_json::from_slice(bytes)?;
        let mut order = Order::deserialize(&raw)?;
        let raw_yards = raw
            .get("yardAssignments")
            .or_else(|| raw.get("additionalInfo"))
            .and_then(serde_json::Value::as_array);
        if let Some(raw_yards) = raw_yards {
            for (yard, raw_yard) in order.yard_assignments.iter_mut().zip(raw_yards) {
                yard.mark_unparsed_amounts(raw_yard);
            }
        }
        Ok(order)
    }

    /// One past the highest assigned yard id
    pub fn next_yard_id(&self) -> u32 {
        self.yard_assignments
            .iter()
            .map(|y| y.id)
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Give legacy assignments (loaded with id 0) stable ids in index order.
    ///
    /// Returns true when any id was assigned.
    pub fn ensure_yard_ids(&mut self) -> bool {
        if self.yard_assignments.iter().all(|y| y.id != 0) {
            return false;
        }
        let mut next = self.next_yard_id();
        for yard in self.yard_assignments.iter_mut().filter(|y| y.id == 0) {
            yard.id = next;
            next += 1;
        }
        true
    }

    pub fn yard_index_of(&self, yard_id: u32) -> Option<usize> {
        self.yard_assignments.iter().position(|y| y.id == yard_id)
    }

    pub fn yard(&self, index: usize) -> Option<&YardAssignment> {
        self.yard_assignments.get(index)
    }

    pub fn has_card_charged_yard(&self) -> bool {
        self.yard_assignments.iter().any(YardAssignment::is_card_charged)
    }

    pub fn has_po_cancelled_yard(&self) -> bool {
        self.yard_assignments.iter().any(YardAssignment::is_po_cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yard(id: u32, status: &str) -> YardAssignment {
        YardAssignment {
            id,
            yard_name: format!("Yard {id}"),
            status: status.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_status_serde_uses_display_strings() {
        for status in OrderStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            let back: OrderStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
    }

    #[test]
    fn test_can_add_yard() {
        let mut order = Order::new("A-1", OrderStatus::Placed);
        assert!(order.can_add_yard());

        order.yard_assignments.push(yard(1, "Yard located"));
        assert!(!order.can_add_yard());

        order.yard_assignments[0].status = "PO cancelled".to_string();
        assert!(order.can_add_yard());

        order.yard_assignments.push(yard(2, "Escalation"));
        assert!(order.can_add_yard());
    }

    #[test]
    fn test_ensure_yard_ids_keeps_existing_ids() {
        let mut order = Order::new("A-1", OrderStatus::Placed);
        order.yard_assignments = vec![yard(0, "a"), yard(4, "b"), yard(0, "c")];
        assert!(order.ensure_yard_ids());
        let ids: Vec<u32> = order.yard_assignments.iter().map(|y| y.id).collect();
        assert_eq!(ids, vec![5, 4, 6]);
        assert!(!order.ensure_yard_ids());
        assert_eq!(order.next_yard_id(), 7);
    }

    #[test]
    fn test_document_field_names() {
        let order: Order = serde_json::from_str(
            r#"{
                "orderNo": "A-100",
                "orderStatus": "Order Cancelled",
                "soldPrice": "300",
                "salesTax": 10,
                "customerRefundAmount": 250,
                "actualGP": 40,
                "additionalInfo": [{"yardName": "North Yard"}]
            }"#,
        )
        .unwrap();
        assert_eq!(order.order_status, OrderStatus::OrderCancelled);
        assert_eq!(order.sold_price, 300.0);
        assert_eq!(order.actual_gp, 40.0);
        assert_eq!(order.yard_assignments.len(), 1);

        let json = serde_json::to_value(&order).unwrap();
        assert!(json.get("yardAssignments").is_some());
        assert!(json.get("actualGP").is_some());
    }

    #[test]
    fn test_from_json_slice_marks_unparsed_yard_amounts() {
        let order = Order::from_json_slice(
            br#"{
                "orderNo": "L-1",
                "additionalInfo": [
                    {"yardName": "Old Yard", "partPrice": "eighty"},
                    {"yardName": "New Yard", "partPrice": "80", "otherCharges": "tbd"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(order.yard_assignments[0].part_price, 0.0);
        assert_eq!(order.yard_assignments[0].unparsed_amounts, vec!["part_price"]);
        assert_eq!(order.yard_assignments[1].part_price, 80.0);
        assert_eq!(order.yard_assignments[1].unparsed_amounts, vec!["other_charges"]);

        assert!(Order::from_json_slice(b"not json").is_err());
    }
}

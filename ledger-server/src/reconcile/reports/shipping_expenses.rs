//! Shipping spend on card-charged yards

use super::{aggregate, Report};
use crate::reconcile::money::{sum, to_f64};
use crate::reconcile::yard_ledger::predicates;
use serde::Serialize;
use shared::order::{Order, OrderStatus, ShippingCost};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingExpenseYard {
    pub index: usize,
    pub yard_id: u32,
    pub yard_name: String,
    pub shipping: ShippingCost,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingExpenseRow {
    pub order_no: String,
    pub order_status: OrderStatus,
    pub yards: Vec<ShippingExpenseYard>,
    pub shipping_total: f64,
}

pub fn report(orders: &[Order]) -> Report<ShippingExpenseRow> {
    aggregate(orders, predicates::card_charged, |order, lines| {
        let shipping = sum(lines.iter().map(|l| l.shipping.amount));
        let row = ShippingExpenseRow {
            order_no: order.order_no.clone(),
            order_status: order.order_status,
            yards: lines
                .iter()
                .map(|l| ShippingExpenseYard {
                    index: l.index,
                    yard_id: l.assignment.id,
                    yard_name: l.assignment.yard_name.clone(),
                    shipping: l.shipping,
                })
                .collect(),
            shipping_total: to_f64(shipping),
        };
        (row, shipping)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::reports::fixtures::{book, charged, order, yard};
    use crate::reconcile::warning::WarningKind;
    use shared::order::{RawAmount, ShippingFields, ShippingSpec};

    #[test]
    fn test_sums_both_shipping_types() {
        let orders = vec![order(
            "A-1",
            vec![
                charged(yard(1, 10.0, ShippingCost::yard(12.5))),
                charged(yard(2, 10.0, ShippingCost::own(7.5))),
                yard(3, 10.0, ShippingCost::yard(100.0)),
            ],
        )];
        let report = report(&orders);
        assert_eq!(report.rows[0].shipping_total, 20.0);
        assert_eq!(report.rows[0].yards.len(), 2);
        assert_eq!(report.grand_total, 20.0);
    }

    #[test]
    fn test_book_totals() {
        let report = report(&book());
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.grand_total, 10.0);
    }

    #[test]
    fn test_conflict_is_a_warning_not_a_failure() {
        let mut bad = charged(yard(1, 10.0, ShippingCost::NONE));
        bad.shipping = Some(ShippingSpec::Fields(ShippingFields::new(
            Some(RawAmount::Number(4.0)),
            Some(RawAmount::Number(6.0)),
        )));
        let orders = vec![
            order("A-1", vec![bad]),
            order("B-2", vec![charged(yard(1, 10.0, ShippingCost::yard(3.0)))]),
        ];

        let report = report(&orders);
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].shipping_total, 0.0);
        assert_eq!(report.grand_total, 3.0);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].kind, WarningKind::ShippingConflict);
        assert_eq!(report.warnings[0].order_no, "A-1");
    }

    #[test]
    fn test_unrecognized_shipping_is_reported() {
        let mut odd = charged(yard(1, 10.0, ShippingCost::NONE));
        odd.shipping = Some(serde_json::from_str(r#"{"type": "Yard", "amount": "7"}"#).unwrap());
        let mut bogus = charged(yard(2, 10.0, ShippingCost::NONE));
        bogus.shipping = Some(serde_json::from_str(r#"{"type": "freight", "amount": 9}"#).unwrap());
        let report = report(&[order("A-1", vec![odd, bogus])]);

        assert_eq!(report.rows[0].shipping_total, 7.0);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].kind, WarningKind::UnparsedShipping);
        assert_eq!(report.warnings[0].yard_index, 1);
    }

    #[test]
    fn test_report_is_pure() {
        let orders = book();
        let before = orders.clone();
        assert_eq!(report(&orders), report(&orders));
        assert_eq!(orders, before);
    }
}

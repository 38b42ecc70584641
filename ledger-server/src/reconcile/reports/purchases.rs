//! Card-charged purchases

use super::{aggregate, Report};
use crate::reconcile::money::to_decimal;
use crate::reconcile::yard_ledger::{predicates, subtotal, LedgerTotals};
use serde::Serialize;
use shared::order::{Order, OrderStatus, ShippingCost};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseYard {
    pub index: usize,
    pub yard_id: u32,
    pub yard_name: String,
    pub status: String,
    pub part_price: f64,
    pub shipping: ShippingCost,
    pub other_charges: f64,
    pub reimbursement: f64,
    pub refunded: f64,
    pub gross: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRow {
    pub order_no: String,
    pub order_status: OrderStatus,
    pub sold_price: f64,
    pub yards: Vec<PurchaseYard>,
    /// Sums over the charged yards only
    pub totals: LedgerTotals,
}

pub fn report(orders: &[Order]) -> Report<PurchaseRow> {
    aggregate(orders, predicates::card_charged, |order, lines| {
        let totals = subtotal(lines.iter().copied());
        let row = PurchaseRow {
            order_no: order.order_no.clone(),
            order_status: order.order_status,
            sold_price: order.sold_price,
            yards: lines
                .iter()
                .map(|l| PurchaseYard {
                    index: l.index,
                    yard_id: l.assignment.id,
                    yard_name: l.assignment.yard_name.clone(),
                    status: l.assignment.status.clone(),
                    part_price: l.part_price,
                    shipping: l.shipping,
                    other_charges: l.other_charges,
                    reimbursement: l.reimbursement,
                    refunded: l.refunded,
                    gross: l.gross,
                })
                .collect(),
            totals,
        };
        (row, to_decimal(totals.overall_after_refund))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::reports::fixtures::{book, charged, order, yard};

    #[test]
    fn test_only_charged_yards() {
        let report = report(&book());
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].order_no, "A-1");
        assert_eq!(report.rows[0].totals.overall_after_refund, 70.0);
        assert_eq!(report.grand_total, 70.0);
    }

    #[test]
    fn test_totals_exclude_uncharged_yards_of_same_order() {
        let mut first = charged(yard(1, 100.0, ShippingCost::yard(20.0)));
        first.refunded_amount = 15.0;
        let second = charged(yard(2, 50.0, ShippingCost::own(5.0)));
        let orders = vec![
            order("A-1", vec![first, yard(3, 999.0, ShippingCost::NONE), second]),
            order("B-2", vec![charged(yard(1, 10.0, ShippingCost::NONE))]),
        ];

        let report = report(&orders);
        let row = &report.rows[0];
        assert_eq!(row.yards.len(), 2);
        assert_eq!(row.totals.part_price, 150.0);
        assert_eq!(row.totals.shipping, 25.0);
        assert_eq!(row.totals.refunded, 15.0);
        assert_eq!(row.totals.overall_after_refund, 160.0);
        assert_eq!(report.grand_total, 170.0);
    }

    #[test]
    fn test_report_is_pure() {
        let orders = book();
        let before = orders.clone();
        assert_eq!(report(&orders), report(&orders));
        assert_eq!(orders, before);
    }
}

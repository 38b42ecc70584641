//! Yards still waiting on a customer charge

use super::{aggregate, Report};
use crate::reconcile::money::{sum, to_f64};
use crate::reconcile::yard_ledger::predicates;
use serde::Serialize;
use shared::order::{Order, OrderStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardNotChargedYard {
    pub index: usize,
    pub yard_id: u32,
    pub yard_name: String,
    pub status: String,
    pub part_price: f64,
    /// Yard-billed shipping only; own shipping is never charged to the card
    pub yard_shipping: f64,
    pub other_charges: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardNotChargedRow {
    pub order_no: String,
    pub order_status: OrderStatus,
    pub sold_price: f64,
    pub yards: Vec<CardNotChargedYard>,
    /// Σ part + yard shipping + other over the listed yards
    pub approximate_charge: f64,
}

pub fn report(orders: &[Order]) -> Report<CardNotChargedRow> {
    aggregate(orders, predicates::card_not_charged, |order, lines| {
        let charge = sum(
            lines
                .iter()
                .flat_map(|l| [l.part_price, l.yard_shipping(), l.other_charges]),
        );
        let row = CardNotChargedRow {
            order_no: order.order_no.clone(),
            order_status: order.order_status,
            sold_price: order.sold_price,
            yards: lines
                .iter()
                .map(|l| CardNotChargedYard {
                    index: l.index,
                    yard_id: l.assignment.id,
                    yard_name: l.assignment.yard_name.clone(),
                    status: l.assignment.status.clone(),
                    part_price: l.part_price,
                    yard_shipping: l.yard_shipping(),
                    other_charges: l.other_charges,
                })
                .collect(),
            approximate_charge: to_f64(charge),
        };
        (row, charge)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::reports::fixtures::{book, charged, order, yard};
    use shared::order::ShippingCost;

    #[test]
    fn test_only_open_uncharged_yards() {
        let report = report(&book());
        assert_eq!(report.rows.len(), 1);
        let row = &report.rows[0];
        assert_eq!(row.order_no, "B-2");
        assert_eq!(row.yards.len(), 1);
        assert_eq!(row.yards[0].index, 1);
        assert_eq!(row.approximate_charge, 85.0);
        assert_eq!(report.grand_total, 85.0);
    }

    #[test]
    fn test_po_cancelled_only_order_is_excluded() {
        let mut cancelled = yard(1, 100.0, ShippingCost::yard(20.0));
        cancelled.status = "PO cancelled".to_string();
        let report = report(&[order("A-1", vec![cancelled])]);
        assert!(report.is_empty());
        assert_eq!(report.grand_total, 0.0);
    }

    #[test]
    fn test_yard_shipping_counts_own_does_not() {
        let orders = vec![order(
            "A-1",
            vec![
                yard(1, 100.0, ShippingCost::yard(20.0)),
                yard(2, 50.0, ShippingCost::own(9.0)),
                charged(yard(3, 70.0, ShippingCost::yard(5.0))),
            ],
        )];
        let report = report(&orders);
        assert_eq!(report.rows[0].approximate_charge, 170.0);
        assert_eq!(report.rows[0].yards[1].yard_shipping, 0.0);
    }

    #[test]
    fn test_report_is_pure() {
        let orders = book();
        let before = orders.clone();
        let first = report(&orders);
        let second = report(&orders);
        assert_eq!(first, second);
        assert_eq!(orders, before);
    }
}

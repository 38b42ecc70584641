//! Refunds owed by yards
//!
//! A yard's `refund_to_collect` stops counting as soon as any refund lands,
//! so a completed collection is never counted twice.

use super::{aggregate, Report};
use crate::reconcile::money::{sum, to_f64};
use crate::reconcile::yard_ledger::predicates;
use serde::Serialize;
use shared::order::{Order, OrderStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectRefundYard {
    pub index: usize,
    pub yard_id: u32,
    pub yard_name: String,
    pub status: String,
    pub refunded_amount: f64,
    pub refund_to_collect: f64,
    /// True once the yard has refunded anything
    pub collected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectRefundRow {
    pub order_no: String,
    pub order_status: OrderStatus,
    pub yards: Vec<CollectRefundYard>,
    pub refunded_total: f64,
    /// Only yards with nothing refunded yet
    pub to_be_refunded_total: f64,
}

pub fn report(orders: &[Order]) -> Report<CollectRefundRow> {
    aggregate(orders, predicates::collect_refund_flagged, |order, lines| {
        let refunded = sum(lines.iter().map(|l| l.refunded));
        let pending = sum(lines.iter().map(|l| l.pending_refund()));
        let row = CollectRefundRow {
            order_no: order.order_no.clone(),
            order_status: order.order_status,
            yards: lines
                .iter()
                .map(|l| CollectRefundYard {
                    index: l.index,
                    yard_id: l.assignment.id,
                    yard_name: l.assignment.yard_name.clone(),
                    status: l.assignment.status.clone(),
                    refunded_amount: l.refunded,
                    refund_to_collect: l.refund_to_collect,
                    collected: l.refunded > 0.0,
                })
                .collect(),
            refunded_total: to_f64(refunded),
            to_be_refunded_total: to_f64(pending),
        };
        (row, pending)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::reports::fixtures::{book, order, yard};
    use shared::order::ShippingCost;

    #[test]
    fn test_split_refunded_and_pending() {
        let report = report(&book());
        let order_nos: Vec<&str> = report.rows.iter().map(|r| r.order_no.as_str()).collect();
        assert_eq!(order_nos, vec!["A-1", "B-2"]);

        assert_eq!(report.rows[0].to_be_refunded_total, 25.0);
        assert_eq!(report.rows[0].refunded_total, 0.0);
        assert_eq!(report.rows[1].to_be_refunded_total, 0.0);
        assert_eq!(report.rows[1].refunded_total, 40.0);
        assert!(report.rows[1].yards[0].collected);
        assert_eq!(report.grand_total, 25.0);
    }

    #[test]
    fn test_unflagged_yards_are_ignored() {
        let mut y = yard(1, 50.0, ShippingCost::NONE);
        y.refund_to_collect = 50.0;
        assert!(report(&[order("A-1", vec![y])]).is_empty());
    }

    #[test]
    fn test_report_is_pure() {
        let orders = book();
        let before = orders.clone();
        assert_eq!(report(&orders), report(&orders));
        assert_eq!(orders, before);
    }
}

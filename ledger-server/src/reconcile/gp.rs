//! Actual gross profit
//!
//! `actual_gp` is a pure function of the order. Branches, first match wins:
//!
//! 1. any card-charged yard: `sold − customer_refund − tax − overall_after_refund`
//! 2. order cancelled/refunded, or a PO-cancelled yard with nothing charged:
//!    `sold − customer_refund − tax`
//! 3. dispute: `−(overall_after_refund + tax)`
//! 4. anything else: `0`

use super::money::{self, to_decimal, to_f64};
use super::yard_ledger::{LedgerTotals, YardLedger};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::order::Order;

/// Persisted GP is only rewritten when it moves by at least this much
pub const GP_TOLERANCE: Decimal = money::MONEY_TOLERANCE;

/// Which formula produced an order's GP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GpBranch {
    /// Customer billed, yard paid
    CardCharged,
    /// No supplier was ever paid
    NoYardCost,
    /// Sale not recognized, yard spend is a loss
    Dispute,
    /// Not yet financially resolved
    Unresolved,
}

pub fn explain(order: &Order) -> GpBranch {
    if order.has_card_charged_yard() {
        GpBranch::CardCharged
    } else if order.order_status.is_cancellation() || order.has_po_cancelled_yard() {
        GpBranch::NoYardCost
    } else if order.order_status.is_dispute() {
        GpBranch::Dispute
    } else {
        GpBranch::Unresolved
    }
}

pub fn compute(order: &Order, totals: &LedgerTotals) -> f64 {
    let sold = to_decimal(order.sold_price);
    let tax = to_decimal(order.sales_tax);
    let customer_refund = to_decimal(order.customer_refund_amount);
    let overall = to_decimal(totals.overall_after_refund);

    let gp = match explain(order) {
        GpBranch::CardCharged => sold - customer_refund - tax - overall,
        GpBranch::NoYardCost => sold - customer_refund - tax,
        GpBranch::Dispute => -(overall + tax),
        GpBranch::Unresolved => Decimal::ZERO,
    };
    to_f64(gp)
}

/// Build the ledger and compute in one step
pub fn compute_order(order: &Order) -> f64 {
    compute(order, &YardLedger::build(order).totals())
}

/// Whether a freshly computed GP differs enough from the stored one to persist
pub fn needs_update(old: f64, new: f64) -> bool {
    (to_decimal(old) - to_decimal(new)).abs() >= GP_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{OrderStatus, PaymentStatus, ShippingCost, YardAssignment};

    fn yard(part: f64, shipping: f64, other: f64) -> YardAssignment {
        YardAssignment {
            id: 1,
            yard_name: "North Yard".to_string(),
            part_price: part,
            other_charges: other,
            shipping: Some(ShippingCost::yard(shipping).into()),
            ..Default::default()
        }
    }

    fn order(status: OrderStatus, sold: f64, tax: f64, yards: Vec<YardAssignment>) -> Order {
        let mut order = Order::new("A-1", status);
        order.sold_price = sold;
        order.sales_tax = tax;
        order.yard_assignments = yards;
        order
    }

    #[test]
    fn test_card_charged_nets_yard_cost() {
        let mut y = yard(100.0, 20.0, 0.0);
        y.payment_status = PaymentStatus::CardCharged;
        let order = order(OrderStatus::OrderFulfilled, 300.0, 10.0, vec![y]);

        assert_eq!(explain(&order), GpBranch::CardCharged);
        assert_eq!(compute_order(&order), 170.0);
    }

    #[test]
    fn test_cancelled_without_charge() {
        let mut order = order(OrderStatus::OrderCancelled, 300.0, 10.0, vec![]);
        order.customer_refund_amount = 250.0;

        assert_eq!(explain(&order), GpBranch::NoYardCost);
        assert_eq!(compute_order(&order), 40.0);
    }

    #[test]
    fn test_dispute_is_negative_spend() {
        let order = order(
            OrderStatus::Dispute,
            300.0,
            10.0,
            vec![yard(80.0, 15.0, 5.0)],
        );

        assert_eq!(explain(&order), GpBranch::Dispute);
        assert_eq!(compute_order(&order), -110.0);
    }

    #[test]
    fn test_dispute_counts_reimbursement_and_refund() {
        let mut y = yard(80.0, 15.0, 5.0);
        y.reimbursement_amount = 10.0;
        y.refunded_amount = 30.0;
        let order = order(OrderStatus::DisputeAfterCancellation, 300.0, 10.0, vec![y]);

        assert_eq!(compute_order(&order), -90.0);
    }

    #[test]
    fn test_placed_is_zero() {
        let mut y = yard(80.0, 15.0, 5.0);
        y.refunded_amount = 12.0;
        let mut order = order(OrderStatus::Placed, 999.0, 50.0, vec![y]);
        order.customer_refund_amount = 20.0;

        assert_eq!(explain(&order), GpBranch::Unresolved);
        assert_eq!(compute_order(&order), 0.0);
    }

    #[test]
    fn test_card_charged_wins_over_cancellation() {
        let mut charged = yard(100.0, 20.0, 0.0);
        charged.payment_status = PaymentStatus::CardCharged;
        charged.status = "PO cancelled".to_string();
        let order = order(OrderStatus::Refunded, 300.0, 10.0, vec![charged]);

        assert_eq!(explain(&order), GpBranch::CardCharged);
        assert_eq!(compute_order(&order), 170.0);
    }

    #[test]
    fn test_po_cancelled_yard_ignores_cost() {
        let mut cancelled = yard(100.0, 20.0, 0.0);
        cancelled.status = "PO cancelled".to_string();
        let order = order(OrderStatus::YardProcessing, 300.0, 10.0, vec![cancelled]);

        assert_eq!(explain(&order), GpBranch::NoYardCost);
        assert_eq!(compute_order(&order), 290.0);
    }

    #[test]
    fn test_compute_is_deterministic() {
        let mut a = yard(33.33, 11.11, 0.07);
        a.payment_status = PaymentStatus::CardCharged;
        a.refunded_amount = 3.3;
        let order = order(OrderStatus::InTransit, 199.99, 14.61, vec![a, yard(1.0, 2.0, 3.0)]);

        let totals = YardLedger::build(&order).totals();
        let first = compute(&order, &totals);
        let second = compute(&order, &totals);
        assert_eq!(first.to_bits(), second.to_bits());
        assert_eq!(first, 138.17);
    }

    #[test]
    fn test_needs_update_uses_tolerance() {
        assert!(!needs_update(170.0, 170.0));
        assert!(!needs_update(170.0, 170.004));
        assert!(!needs_update(0.1 + 0.2, 0.3));
        assert!(needs_update(170.0, 170.02));
        assert!(needs_update(0.0, -110.0));
    }
}

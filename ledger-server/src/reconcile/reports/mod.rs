//! Report aggregators
//!
//! Each report is a pure, order-preserving filter + map + reduce over a slice
//! of orders. Orders with no qualifying yard are dropped. Reports carry the
//! data-quality warnings of the yards they include.

pub mod card_not_charged;
pub mod collect_refund;
pub mod purchases;
pub mod shipping_expenses;
pub mod store_credits;

use super::money::to_f64;
use super::warning::DataQualityWarning;
use super::yard_ledger::{YardLedger, YardLine};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::order::{Order, YardAssignment};

pub use card_not_charged::{CardNotChargedRow, CardNotChargedYard};
pub use collect_refund::{CollectRefundRow, CollectRefundYard};
pub use purchases::{PurchaseRow, PurchaseYard};
pub use shipping_expenses::{ShippingExpenseRow, ShippingExpenseYard};
pub use store_credits::{StoreCreditRow, StoreCreditYard};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report<R> {
    pub rows: Vec<R>,
    pub grand_total: f64,
    pub warnings: Vec<DataQualityWarning>,
}

impl<R> Report<R> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Every report over the same order set
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportsSnapshot {
    pub card_not_charged: Report<CardNotChargedRow>,
    pub collect_refund: Report<CollectRefundRow>,
    pub purchases: Report<PurchaseRow>,
    pub shipping_expenses: Report<ShippingExpenseRow>,
    pub store_credits: Report<StoreCreditRow>,
}

pub fn snapshot(orders: &[Order]) -> ReportsSnapshot {
    ReportsSnapshot {
        card_not_charged: card_not_charged::report(orders),
        collect_refund: collect_refund::report(orders),
        purchases: purchases::report(orders),
        shipping_expenses: shipping_expenses::report(orders),
        store_credits: store_credits::report(orders),
    }
}

/// Shared driver: select lines per order, build a row and its contribution
/// to the grand total.
fn aggregate<R, P, F>(orders: &[Order], predicate: P, mut row: F) -> Report<R>
where
    P: Fn(&YardAssignment) -> bool,
    F: FnMut(&Order, &[&YardLine<'_>]) -> (R, Decimal),
{
    let mut rows = Vec::new();
    let mut grand_total = Decimal::ZERO;
    let mut warnings = Vec::new();

    for order in orders {
        let ledger = YardLedger::build(order);
        let lines = ledger.qualifying(&predicate);
        if lines.is_empty() {
            continue;
        }
        warnings.extend(
            ledger
                .warnings()
                .iter()
                .filter(|w| lines.iter().any(|l| l.index == w.yard_index))
                .cloned(),
        );
        let (r, total) = row(order, &lines);
        grand_total += total;
        rows.push(r);
    }

    Report {
        rows,
        grand_total: to_f64(grand_total),
        warnings,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use shared::order::{
        Order, OrderStatus, PaymentStatus, ShippingCost, StoreCreditUsage, YardAssignment,
    };

    pub fn yard(id: u32, part: f64, shipping: ShippingCost) -> YardAssignment {
        YardAssignment {
            id,
            yard_name: format!("Yard {id}"),
            part_price: part,
            shipping: Some(shipping.into()),
            ..Default::default()
        }
    }

    pub fn charged(mut yard: YardAssignment) -> YardAssignment {
        yard.payment_status = PaymentStatus::CardCharged;
        yard
    }

    pub fn order(order_no: &str, yards: Vec<YardAssignment>) -> Order {
        let mut order = Order::new(order_no, OrderStatus::YardProcessing);
        order.sold_price = 300.0;
        order.sales_tax = 10.0;
        order.yard_assignments = yards;
        order
    }

    /// A mixed order set exercising every report
    pub fn book() -> Vec<Order> {
        let mut refund_pending = charged(yard(1, 60.0, ShippingCost::yard(10.0)));
        refund_pending.collect_refund = true;
        refund_pending.refund_to_collect = 25.0;

        let mut refund_done = yard(2, 40.0, ShippingCost::own(5.0));
        refund_done.status = "PO cancelled".to_string();
        refund_done.collect_refund = true;
        refund_done.refunded_amount = 40.0;
        refund_done.refund_to_collect = 40.0;
        refund_done.store_credit = Some(30.0);
        refund_done.store_credit_used_for = vec![StoreCreditUsage {
            order_no: "C-3".to_string(),
            amount: 12.0,
            used_at: None,
        }];

        let mut open = yard(3, 80.0, ShippingCost::own(15.0));
        open.other_charges = 5.0;

        vec![
            order("A-1", vec![refund_pending]),
            order("B-2", vec![refund_done, open]),
            order("C-3", vec![]),
        ]
    }
}

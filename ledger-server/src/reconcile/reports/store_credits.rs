//! Store-credit grants next to what the yard originally charged

use super::{aggregate, Report};
use crate::reconcile::money::{sum, to_decimal, to_f64};
use crate::reconcile::store_credit::{self, CreditUse};
use crate::reconcile::yard_ledger::predicates;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::order::{Order, OrderStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCreditYard {
    pub index: usize,
    pub yard_id: u32,
    pub yard_name: String,
    pub status: String,
    /// part + shipping + other
    pub charged: f64,
    pub store_credit: f64,
    pub used: f64,
    pub remaining: f64,
    pub uses: Vec<CreditUse>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCreditRow {
    pub order_no: String,
    pub order_status: OrderStatus,
    pub yards: Vec<StoreCreditYard>,
    pub charged_total: f64,
    pub credit_total: f64,
    pub used_total: f64,
    pub remaining_total: f64,
}

pub fn report(orders: &[Order]) -> Report<StoreCreditRow> {
    aggregate(orders, predicates::has_store_credit, |order, lines| {
        let yards: Vec<StoreCreditYard> = lines
            .iter()
            .map(|l| {
                let issued = l.assignment.credit_granted().unwrap_or_default();
                let remaining = store_credit::remaining(l.assignment).unwrap_or_default();
                StoreCreditYard {
                    index: l.index,
                    yard_id: l.assignment.id,
                    yard_name: l.assignment.yard_name.clone(),
                    status: l.assignment.status.clone(),
                    charged: l.charged(),
                    store_credit: issued,
                    used: to_f64(to_decimal(issued) - remaining),
                    remaining: to_f64(remaining),
                    uses: l
                        .assignment
                        .store_credit_used_for
                        .iter()
                        .map(|u| CreditUse {
                            target_order_no: u.order_no.clone(),
                            amount: u.amount,
                            used_at: u.used_at,
                        })
                        .collect(),
                }
            })
            .collect();

        let credit: Decimal = sum(yards.iter().map(|y| y.store_credit));
        let row = StoreCreditRow {
            order_no: order.order_no.clone(),
            order_status: order.order_status,
            charged_total: to_f64(sum(yards.iter().map(|y| y.charged))),
            credit_total: to_f64(credit),
            used_total: to_f64(sum(yards.iter().map(|y| y.used))),
            remaining_total: to_f64(sum(yards.iter().map(|y| y.remaining))),
            yards,
        };
        (row, credit)
    })
}

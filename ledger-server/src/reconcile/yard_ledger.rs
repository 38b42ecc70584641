//! Yard ledger - per-order view over yard assignments
//!
//! Every report and the GP calculator read yard costs through this type, so
//! there is exactly one definition of an assignment's cost.
//!
//! Per assignment: `gross = part_price + shipping + other_charges + reimbursement`.
//! Per order: `overall_after_refund = Σ gross − Σ refunded`.
//!
//! Stored data is never rejected here. Conflicting or unparsable shipping and
//! negative amounts contribute 0 and are reported in [`YardLedger::warnings`].

use super::money::{self, to_decimal, to_f64};
use super::shipping;
use super::warning::{DataQualityWarning, WarningKind};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::order::{Order, ShippingCost, YardAssignment};

/// Aggregate sums across a set of assignments
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerTotals {
    pub part_price: f64,
    pub shipping: f64,
    pub other_charges: f64,
    pub reimbursement: f64,
    pub refunded: f64,
    /// `refund_to_collect` of assignments not yet refunded
    pub to_be_refunded: f64,
    pub overall_after_refund: f64,
}

/// One assignment with its amounts resolved and sanitized
#[derive(Debug, Clone, PartialEq)]
pub struct YardLine<'a> {
    pub index: usize,
    pub assignment: &'a YardAssignment,
    pub shipping: ShippingCost,
    pub part_price: f64,
    pub other_charges: f64,
    pub reimbursement: f64,
    pub refunded: f64,
    pub refund_to_collect: f64,
    /// part + shipping + other + reimbursement
    pub gross: f64,
}

impl YardLine<'_> {
    /// Shipping billed by the yard; own shipping is paid separately
    pub fn yard_shipping(&self) -> f64 {
        if self.shipping.is_yard() {
            self.shipping.amount
        } else {
            0.0
        }
    }

    /// part + shipping + other, without reimbursement
    pub fn charged(&self) -> f64 {
        to_f64(
            to_decimal(self.part_price)
                + to_decimal(self.shipping.amount)
                + to_decimal(self.other_charges),
        )
    }

    /// Amount still pending from the yard: only counted before any refund landed
    pub fn pending_refund(&self) -> f64 {
        if self.refunded == 0.0 {
            self.refund_to_collect
        } else {
            0.0
        }
    }
}

/// Ordered, index-addressable ledger for one order
#[derive(Debug, Clone)]
pub struct YardLedger<'a> {
    order: &'a Order,
    lines: Vec<YardLine<'a>>,
    warnings: Vec<DataQualityWarning>,
}

impl<'a> YardLedger<'a> {
    pub fn build(order: &'a Order) -> Self {
        let mut warnings = Vec::new();
        let lines = order
            .yard_assignments
            .iter()
            .enumerate()
            .map(|(index, yard)| build_line(&order.order_no, index, yard, &mut warnings))
            .collect();
        Self {
            order,
            lines,
            warnings,
        }
    }

    pub fn order(&self) -> &'a Order {
        self.order
    }

    pub fn assignments(&self) -> &'a [YardAssignment] {
        &self.order.yard_assignments
    }

    pub fn lines(&self) -> &[YardLine<'a>] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&YardLine<'a>> {
        self.lines.get(index)
    }

    pub fn totals(&self) -> LedgerTotals {
        subtotal(&self.lines)
    }

    /// Lines whose assignment satisfies `predicate`, in index order
    pub fn qualifying<P>(&self, predicate: P) -> Vec<&YardLine<'a>>
    where
        P: Fn(&YardAssignment) -> bool,
    {
        self.lines
            .iter()
            .filter(|line| predicate(line.assignment))
            .collect()
    }

    pub fn warnings(&self) -> &[DataQualityWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<DataQualityWarning> {
        self.warnings
    }
}

/// Sum a subset of lines the same way [`YardLedger::totals`] does
pub fn subtotal<'b, 'a: 'b, I>(lines: I) -> LedgerTotals
where
    I: IntoIterator<Item = &'b YardLine<'a>>,
{
    let mut part = Decimal::ZERO;
    let mut ship = Decimal::ZERO;
    let mut other = Decimal::ZERO;
    let mut reimb = Decimal::ZERO;
    let mut refunded = Decimal::ZERO;
    let mut pending = Decimal::ZERO;
    for line in lines {
        part += to_decimal(line.part_price);
        ship += to_decimal(line.shipping.amount);
        other += to_decimal(line.other_charges);
        reimb += to_decimal(line.reimbursement);
        refunded += to_decimal(line.refunded);
        pending += to_decimal(line.pending_refund());
    }
    LedgerTotals {
        part_price: to_f64(part),
        shipping: to_f64(ship),
        other_charges: to_f64(other),
        reimbursement: to_f64(reimb),
        refunded: to_f64(refunded),
        to_be_refunded: to_f64(pending),
        overall_after_refund: to_f64(part + ship + other + reimb - refunded),
    }
}

fn build_line<'a>(
    order_no: &str,
    index: usize,
    yard: &'a YardAssignment,
    warnings: &mut Vec<DataQualityWarning>,
) -> YardLine<'a> {
    let mut warn = |kind: WarningKind, message: String| {
        warnings.push(DataQualityWarning::new(order_no, index, kind, message));
    };

    let shipping = match shipping::resolve_yard(yard) {
        Ok(resolution) => {
            if resolution.parse_failed {
                warn(
                    WarningKind::UnparsedShipping,
                    "shipping amount could not be parsed, counted as 0".to_string(),
                );
            }
            let mut cost = resolution.cost;
            if cost.amount < 0.0 || !cost.amount.is_finite() {
                warn(
                    WarningKind::NegativeAmount,
                    format!("shipping is {}, counted as 0", cost.amount),
                );
                cost.amount = 0.0;
            }
            cost
        }
        Err(err) => {
            warn(WarningKind::ShippingConflict, err.to_string());
            ShippingCost::NONE
        }
    };

    for field in &yard.unparsed_amounts {
        warn(
            WarningKind::UnparsedAmount,
            format!("{field} could not be parsed, counted as 0"),
        );
    }

    let mut amount = |field: &str, value: f64| -> f64 {
        if value.is_finite() && value >= 0.0 {
            value
        } else {
            warn(
                WarningKind::NegativeAmount,
                format!("{field} is {value}, counted as 0"),
            );
            0.0
        }
    };
    let part_price = amount("part_price", yard.part_price);
    let other_charges = amount("other_charges", yard.other_charges);
    let reimbursement = amount("reimbursement_amount", yard.reimbursement_amount);
    let refunded = amount("refunded_amount", yard.refunded_amount);
    let refund_to_collect = amount("refund_to_collect", yard.refund_to_collect);

    let gross = to_f64(money::sum([
        part_price,
        shipping.amount,
        other_charges,
        reimbursement,
    ]));
    if to_decimal(refunded) - to_decimal(gross) >= money::MONEY_TOLERANCE {
        warn(
            WarningKind::RefundExceedsCost,
            format!("refunded {refunded} exceeds gross cost {gross}"),
        );
    }

    YardLine {
        index,
        assignment: yard,
        shipping,
        part_price,
        other_charges,
        reimbursement,
        refunded,
        refund_to_collect,
        gross,
    }
}

/// Assignment predicates shared by reports and the GP calculator
pub mod predicates {
    use shared::order::YardAssignment;

    /// Still waiting on a customer charge: not charged and not PO cancelled
    pub fn card_not_charged(yard: &YardAssignment) -> bool {
        !yard.is_card_charged() && !yard.is_po_cancelled()
    }

    pub fn card_charged(yard: &YardAssignment) -> bool {
        yard.is_card_charged()
    }

    pub fn collect_refund_flagged(yard: &YardAssignment) -> bool {
        yard.collect_refund
    }

    pub fn has_store_credit(yard: &YardAssignment) -> bool {
        yard.is_credit_grant()
    }
}

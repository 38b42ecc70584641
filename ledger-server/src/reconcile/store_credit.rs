//! Store-credit ledger
//!
//! A grant is any yard assignment carrying a positive `store_credit`. Usage
//! entries live on the grant itself (`store_credit_used_for`), so the ledger is
//! derived entirely from the order set and never persisted on its own.
//!
//! For every grant: `remaining = issued − Σ used`. [`apply_usage`] refuses any
//! draw that would push `remaining` below zero; callers run it inside a write
//! transaction so the read of `remaining` and the append happen atomically.
//!
//! Stored usage entries that are negative or not finite count as 0 and are
//! reported, so `remaining` never exceeds `issued`.

use super::error::{ReconcileError, ReconcileResult};
use super::money::{round, sum, to_decimal, to_f64, validate_positive};
use super::warning::{DataQualityWarning, WarningKind};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::order::{Order, StoreCreditUsage, UsageType, YardAssignment};
use std::collections::BTreeMap;

/// One draw against a grant
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditUse {
    pub target_order_no: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_at: Option<i64>,
}

/// A single grant with its usage breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditGrant {
    pub source_order_no: String,
    pub grant_index: usize,
    pub yard_id: u32,
    pub yard_name: String,
    pub issued: f64,
    pub used: f64,
    pub remaining: f64,
    pub uses: Vec<CreditUse>,
}

/// Everything one yard has granted, across all orders
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YardCreditSummary {
    pub yard_name: String,
    pub total_issued: f64,
    pub total_used: f64,
    pub total_remaining: f64,
    pub grants: Vec<CreditGrant>,
}

/// Result of a successful [`apply_usage`]
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedUsage {
    pub usage: StoreCreditUsage,
    /// Grant balance after the draw
    pub remaining: f64,
}

#[derive(Debug, Clone, Default)]
pub struct StoreCreditLedger {
    yards: BTreeMap<String, YardCreditSummary>,
    warnings: Vec<DataQualityWarning>,
}

impl StoreCreditLedger {
    pub fn build(orders: &[Order]) -> Self {
        let mut yards: BTreeMap<String, YardCreditSummary> = BTreeMap::new();
        let mut warnings = Vec::new();

        for order in orders {
            for (index, yard) in order.yard_assignments.iter().enumerate() {
                let Some(grant) = grant_detail(order, index, yard) else {
                    continue;
                };
                for entry in yard
                    .store_credit_used_for
                    .iter()
                    .filter(|u| !is_countable(u.amount))
                {
                    warnings.push(DataQualityWarning::new(
                        &order.order_no,
                        index,
                        WarningKind::NegativeAmount,
                        format!(
                            "credit {} usage for {} is {}, counted as 0",
                            grant.yard_name, entry.order_no, entry.amount
                        ),
                    ));
                }
                if grant.remaining < 0.0 {
                    warnings.push(DataQualityWarning::new(
                        &order.order_no,
                        index,
                        WarningKind::OverdrawnCredit,
                        format!(
                            "credit {} used {} exceeds issued {}",
                            grant.yard_name, grant.used, grant.issued
                        ),
                    ));
                }
                let name = grant.yard_name.clone();
                yards
                    .entry(name.clone())
                    .or_insert_with(|| YardCreditSummary {
                        yard_name: name,
                        total_issued: 0.0,
                        total_used: 0.0,
                        total_remaining: 0.0,
                        grants: Vec::new(),
                    })
                    .grants
                    .push(grant);
            }
        }

        for summary in yards.values_mut() {
            let issued = sum(summary.grants.iter().map(|g| g.issued));
            let used = sum(summary.grants.iter().map(|g| g.used));
            summary.total_issued = to_f64(issued);
            summary.total_used = to_f64(used);
            summary.total_remaining = to_f64(issued - used);
        }

        Self { yards, warnings }
    }

    /// Summaries keyed by yard name, in name order
    pub fn yards(&self) -> &BTreeMap<String, YardCreditSummary> {
        &self.yards
    }

    pub fn yard(&self, yard_name: &str) -> Option<&YardCreditSummary> {
        self.yards.get(yard_name.trim())
    }

    pub fn grant(&self, order_no: &str, grant_index: usize) -> Option<&CreditGrant> {
        self.yards
            .values()
            .flat_map(|s| s.grants.iter())
            .find(|g| g.source_order_no == order_no && g.grant_index == grant_index)
    }

    pub fn remaining_for(&self, order_no: &str, grant_index: usize) -> Option<f64> {
        self.grant(order_no, grant_index).map(|g| g.remaining)
    }

    pub fn total_issued(&self) -> f64 {
        to_f64(sum(self.yards.values().map(|s| s.total_issued)))
    }

    pub fn total_remaining(&self) -> f64 {
        to_f64(sum(self.yards.values().map(|s| s.total_remaining)))
    }

    pub fn warnings(&self) -> &[DataQualityWarning] {
        &self.warnings
    }
}

/// Balance left on one assignment, `None` when it is not a grant
pub fn remaining(yard: &YardAssignment) -> Option<Decimal> {
    let issued = yard.credit_granted()?;
    Some(to_decimal(issued) - used(yard))
}

/// Total drawn from an assignment; invalid entries count as 0
pub fn used(yard: &YardAssignment) -> Decimal {
    sum(yard.store_credit_used_for.iter().map(|u| counted(u.amount)))
}

fn is_countable(amount: f64) -> bool {
    amount.is_finite() && amount >= 0.0
}

fn counted(amount: f64) -> f64 {
    if is_countable(amount) { amount } else { 0.0 }
}

fn grant_detail(order: &Order, index: usize, yard: &YardAssignment) -> Option<CreditGrant> {
    let issued = yard.credit_granted()?;
    let used = used(yard);
    Some(CreditGrant {
        source_order_no: order.order_no.clone(),
        grant_index: index,
        yard_id: yard.id,
        yard_name: yard.yard_name.trim().to_string(),
        issued: to_f64(to_decimal(issued)),
        used: to_f64(used),
        remaining: to_f64(to_decimal(issued) - used),
        uses: yard
            .store_credit_used_for
            .iter()
            .map(|u| CreditUse {
                target_order_no: u.order_no.clone(),
                amount: counted(u.amount),
                used_at: u.used_at,
            })
            .collect(),
    })
}

/// Draw against the grant at `grant_index` of `source`
///
/// `Full` takes the whole remaining balance; `Partial` must be in `(0, remaining]`.
/// On error `source` is left untouched.
pub fn apply_usage(
    source: &mut Order,
    grant_index: usize,
    usage: UsageType,
    target_order_no: &str,
    used_at: i64,
) -> ReconcileResult<AppliedUsage> {
    let target_order_no = target_order_no.trim();
    if target_order_no.is_empty() {
        return Err(ReconcileError::InvalidAmount {
            field: "target_order_no",
            reason: "target order must not be blank".to_string(),
        });
    }

    let not_found = || ReconcileError::GrantNotFound {
        order_no: source.order_no.clone(),
        index: grant_index,
    };
    let yard = source
        .yard_assignments
        .get_mut(grant_index)
        .ok_or_else(not_found)?;
    let balance = round(remaining(yard).ok_or_else(not_found)?);

    let amount = match usage {
        UsageType::Full => {
            if balance <= Decimal::ZERO {
                return Err(ReconcileError::InsufficientCredit {
                    requested: 0.0,
                    remaining: to_f64(balance),
                });
            }
            balance
        }
        UsageType::Partial(requested) => {
            let requested = round(to_decimal(validate_positive(requested, "amount")?));
            if requested.is_zero() {
                return Err(ReconcileError::InvalidAmount {
                    field: "amount",
                    reason: "rounds to zero".to_string(),
                });
            }
            if requested > balance {
                return Err(ReconcileError::InsufficientCredit {
                    requested: to_f64(requested),
                    remaining: to_f64(balance),
                });
            }
            requested
        }
    };

    let entry = StoreCreditUsage {
        order_no: target_order_no.to_string(),
        amount: to_f64(amount),
        used_at: Some(used_at),
    };
    yard.store_credit_used_for.push(entry.clone());

    Ok(AppliedUsage {
        usage: entry,
        remaining: to_f64(balance - amount),
    })
}

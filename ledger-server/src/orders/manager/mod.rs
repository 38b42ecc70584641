//! OrdersManager - mutation processing and GP upkeep
//!
//! Every mutation runs inside one redb write transaction:
//!
//! ```text
//! mutate(order_no, expected_version, change)
//!     ├─ 1. Begin write transaction (serializes all writers)
//!     ├─ 2. Load order, optimistic version check
//!     ├─ 3. Assign stable yard ids to legacy yards
//!     ├─ 4. Validate and apply the change
//!     ├─ 5. Recompute actual_gp
//!     ├─ 6. Bump version, persist
//!     ├─ 7. Commit transaction
//!     └─ 8. Broadcast event(s)
//! ```
//!
//! A failed validation drops the transaction, which aborts it: nothing is
//! partially applied.

mod error;
pub use error::*;

use super::storage::{OrderStorage, StorageError};
use crate::reconcile::money::{round, to_decimal, validate_amount};
use crate::reconcile::{self, gp, shipping, store_credit, AppliedUsage, ReconcileError};
use crate::reconcile::{ReportsSnapshot, StoreCreditLedger};
use shared::order::{
    Escalation, LedgerEvent, LedgerEventKind, NewOrder, NewYard, Order, OrderStatus,
    ShippingPatch, ShippingSpec, StoreCreditUsageRequest, YardAssignment, YardPatch, YardRef,
};
use shared::util::now_millis;
use std::path::Path;
use tokio::sync::broadcast;

/// Default event broadcast channel capacity
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Result of a GP recompute
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GpOutcome {
    /// Stored value already within tolerance; nothing written
    Unchanged(f64),
    Updated { old: f64, new: f64 },
}

/// Counts from a full recompute pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecomputeSummary {
    pub scanned: usize,
    pub updated: usize,
    pub failed: usize,
}

/// OrdersManager for order mutations
///
/// The `epoch` field is a unique identifier generated on each startup so
/// subscribers can detect restarts and resync.
pub struct OrdersManager {
    storage: OrderStorage,
    event_tx: broadcast::Sender<LedgerEvent>,
    epoch: String,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("storage", &"<OrderStorage>")
            .field("event_tx", &"<broadcast::Sender>")
            .field("epoch", &self.epoch)
            .finish()
    }
}

impl OrdersManager {
    /// Create a new OrdersManager with the given database path
    pub fn new(db_path: impl AsRef<Path>, event_capacity: usize) -> ManagerResult<Self> {
        let storage = OrderStorage::open(db_path)?;
        Ok(Self::with_storage(storage, event_capacity))
    }

    /// Create an OrdersManager with existing storage
    pub fn with_storage(storage: OrderStorage, event_capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(event_capacity.max(1));
        let epoch = uuid::Uuid::new_v4().to_string();
        tracing::info!(epoch = %epoch, "OrdersManager started with new epoch");
        Self {
            storage,
            event_tx,
            epoch,
        }
    }

    /// Get the server epoch (unique instance ID)
    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    /// Subscribe to event broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.event_tx.subscribe()
    }

    /// Get storage reference
    pub fn storage(&self) -> &OrderStorage {
        &self.storage
    }

    // ========== Mutations ==========

    pub fn create_order(&self, request: NewOrder) -> ManagerResult<Order> {
        let order_no = request.order_no.trim().to_string();
        if order_no.is_empty() {
            return Err(ManagerError::InvalidRequest(
                "order number must not be blank".to_string(),
            ));
        }
        let sold_price = validate_amount(request.sold_price, "sold_price")?;
        let sales_tax = validate_amount(request.sales_tax, "sales_tax")?;

        let txn = self.storage.begin_write()?;
        if self.storage.get_order_txn(&txn, &order_no)?.is_some() {
            return Err(ManagerError::OrderAlreadyExists(order_no));
        }

        let now = now_millis();
        let mut order = Order::new(order_no, request.order_status);
        order.sold_price = sold_price;
        order.sales_tax = sales_tax;
        order.actual_gp = gp::compute_order(&order);
        order.version = 1;
        order.created_at = now;
        order.updated_at = now;

        let count = self.storage.increment_order_count(&txn)?;
        self.storage.store_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            order_no = %order.order_no,
            status = %order.order_status,
            order_count = count,
            "Order created"
        );
        self.broadcast(vec![LedgerEvent::new(
            &order.order_no,
            order.version,
            LedgerEventKind::OrderCreated,
        )]);
        Ok(order)
    }

    /// Append a yard; allowed only when every existing yard is PO cancelled or escalated
    pub fn add_yard(&self, order_no: &str, request: NewYard) -> ManagerResult<Order> {
        let yard_name = request.yard_name.trim().to_string();
        if yard_name.is_empty() {
            return Err(ManagerError::InvalidRequest(
                "yard name must not be blank".to_string(),
            ));
        }
        let part_price = validate_amount(request.part_price, "part_price")?;
        let other_charges = validate_amount(request.other_charges, "other_charges")?;
        let cost = shipping::from_fields(
            request.own_shipping.as_ref(),
            request.yard_shipping.as_ref(),
        )?;

        self.mutate(order_no, None, |order| {
            if !order.can_add_yard() {
                return Err(ManagerError::YardAddNotAllowed(order.order_no.clone()));
            }
            let yard = YardAssignment {
                id: order.next_yard_id(),
                yard_name,
                contact_name: request.contact_name,
                phone: request.phone,
                email: request.email,
                address: request.address,
                part_price,
                other_charges,
                shipping: Some(ShippingSpec::Structured(cost)),
                payment_status: request.payment_status,
                status: request.status,
                ..Default::default()
            };
            let yard_id = yard.id;
            order.yard_assignments.push(yard);
            let index = order.yard_assignments.len() - 1;
            tracing::info!(order_no = %order.order_no, yard_id, index, "Yard added");
            Ok(vec![LedgerEventKind::YardAdded { yard_id, index }])
        })
    }

    /// Edit one yard in place
    ///
    /// Prefer [`YardRef::Id`]; an [`YardRef::IndexChecked`] whose index now
    /// holds a different yard fails with `StaleIndex`. `expected_version`, when
    /// given, must match the stored version.
    pub fn update_yard(
        &self,
        order_no: &str,
        yard_ref: YardRef,
        patch: YardPatch,
        expected_version: Option<u64>,
    ) -> ManagerResult<Order> {
        if patch.is_empty() {
            return Err(ManagerError::InvalidRequest("empty yard patch".to_string()));
        }

        self.mutate(order_no, expected_version, |order| {
            let index = resolve_yard_ref(order, yard_ref)?;
            let now = now_millis();
            let yard = &mut order.yard_assignments[index];
            apply_patch(yard, patch, now)?;
            let yard_id = yard.id;
            tracing::info!(order_no = %order.order_no, yard_id, index, "Yard updated");
            Ok(vec![LedgerEventKind::YardUpdated { yard_id, index }])
        })
    }

    pub fn set_order_status(&self, order_no: &str, status: OrderStatus) -> ManagerResult<Order> {
        self.mutate(order_no, None, |order| {
            let from = order.order_status;
            if from == status {
                return Ok(vec![]);
            }
            order.order_status = status;
            tracing::info!(order_no = %order.order_no, from = %from, to = %status, "Order status changed");
            Ok(vec![LedgerEventKind::StatusChanged { from, to: status }])
        })
    }

    /// Set the cumulative customer refund
    pub fn set_customer_refund(&self, order_no: &str, amount: f64) -> ManagerResult<Order> {
        let amount = validate_amount(amount, "customer_refund_amount")?;
        self.mutate(order_no, None, |order| {
            if order.customer_refund_amount == amount {
                return Ok(vec![]);
            }
            order.customer_refund_amount = amount;
            tracing::info!(order_no = %order.order_no, amount, "Customer refund changed");
            Ok(vec![LedgerEventKind::CustomerRefundChanged { amount }])
        })
    }

    /// Draw store credit from a grant on one order for use on another
    ///
    /// The remaining balance is read and the usage appended inside one write
    /// transaction, so concurrent draws on the same grant cannot overspend it.
    pub fn use_store_credit(
        &self,
        request: StoreCreditUsageRequest,
    ) -> ManagerResult<AppliedUsage> {
        let usage = request.usage();
        let target_order_no = request.target_order_no.trim().to_string();
        let mut applied = None;

        self.mutate(&request.source_order_no, None, |order| {
            if !target_order_no.is_empty()
                && target_order_no != order.order_no
                && self.storage.get_order(&target_order_no)?.is_none()
            {
                return Err(ManagerError::OrderNotFound(target_order_no.clone()));
            }
            let result = store_credit::apply_usage(
                order,
                request.grant_index,
                usage,
                &target_order_no,
                now_millis(),
            )?;
            tracing::info!(
                order_no = %order.order_no,
                grant_index = request.grant_index,
                amount = result.usage.amount,
                target_order_no = %target_order_no,
                remaining = result.remaining,
                "Store credit used"
            );
            let kind = LedgerEventKind::StoreCreditUsed {
                grant_index: request.grant_index,
                amount: result.usage.amount,
                target_order_no: target_order_no.clone(),
                remaining: result.remaining,
            };
            applied = Some(result);
            Ok(vec![kind])
        })?;

        applied.ok_or_else(|| ManagerError::InvalidRequest("store credit not applied".to_string()))
    }

    /// Recompute, compare with tolerance, write if changed, notify
    ///
    /// Safe to run redundantly: an unchanged order is not written.
    pub fn recompute_gp(&self, order_no: &str) -> ManagerResult<GpOutcome> {
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_no)?
            .ok_or_else(|| ManagerError::OrderNotFound(order_no.to_string()))?;

        let old = order.actual_gp;
        let new = gp::compute_order(&order);
        if !gp::needs_update(old, new) {
            txn.abort().map_err(StorageError::from)?;
            tracing::debug!(order_no = %order_no, gp = old, "GP unchanged");
            return Ok(GpOutcome::Unchanged(old));
        }

        order.ensure_yard_ids();
        order.actual_gp = new;
        order.version += 1;
        order.updated_at = now_millis();
        self.storage.store_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            order_no = %order_no,
            old,
            new,
            branch = ?gp::explain(&order),
            "GP recomputed"
        );
        self.broadcast(vec![LedgerEvent::new(
            order_no,
            order.version,
            LedgerEventKind::GpUpdated { old, new },
        )]);
        Ok(GpOutcome::Updated { old, new })
    }

    /// Recompute every stored order; failures are logged and counted
    pub fn recompute_all(&self) -> ManagerResult<RecomputeSummary> {
        let mut summary = RecomputeSummary::default();
        for order_no in self.storage.list_order_nos()? {
            summary.scanned += 1;
            match self.recompute_gp(&order_no) {
                Ok(GpOutcome::Updated { .. }) => summary.updated += 1,
                Ok(GpOutcome::Unchanged(_)) => {}
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(order_no = %order_no, error = %e, "GP recompute failed");
                }
            }
        }
        tracing::info!(
            scanned = summary.scanned,
            updated = summary.updated,
            failed = summary.failed,
            "GP recompute pass finished"
        );
        Ok(summary)
    }

    // ========== Queries ==========

    pub fn get_order(&self, order_no: &str) -> ManagerResult<Option<Order>> {
        Ok(self.storage.get_order(order_no)?)
    }

    pub fn list_orders(&self) -> ManagerResult<Vec<Order>> {
        Ok(self.storage.list_orders()?)
    }

    /// Store-credit ledger over every stored order
    pub fn store_credit_ledger(&self) -> ManagerResult<StoreCreditLedger> {
        Ok(StoreCreditLedger::build(&self.storage.list_orders()?))
    }

    /// Every report over every stored order
    pub fn reports_snapshot(&self) -> ManagerResult<ReportsSnapshot> {
        let orders = self.storage.list_orders()?;
        Ok(reconcile::reports::snapshot(&orders))
    }

    // ========== Internals ==========

    /// Load, change, recompute GP and persist one order in a single transaction
    ///
    /// `change` returns the events to publish; an empty list with no GP or id
    /// change means nothing is written.
    fn mutate<F>(
        &self,
        order_no: &str,
        expected_version: Option<u64>,
        change: F,
    ) -> ManagerResult<Order>
    where
        F: FnOnce(&mut Order) -> ManagerResult<Vec<LedgerEventKind>>,
    {
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_no)?
            .ok_or_else(|| ManagerError::OrderNotFound(order_no.to_string()))?;

        if let Some(expected) = expected_version
            && expected != order.version
        {
            return Err(ManagerError::VersionConflict {
                order_no: order.order_no,
                expected,
                actual: order.version,
            });
        }

        let ids_assigned = order.ensure_yard_ids();
        let mut kinds = change(&mut order)?;

        let old_gp = order.actual_gp;
        let new_gp = gp::compute_order(&order);
        let gp_moved = gp::needs_update(old_gp, new_gp);
        if kinds.is_empty() && !gp_moved && !ids_assigned {
            txn.abort().map_err(StorageError::from)?;
            return Ok(order);
        }
        if gp_moved {
            kinds.push(LedgerEventKind::GpUpdated {
                old: old_gp,
                new: new_gp,
            });
        }
        order.actual_gp = new_gp;
        order.version += 1;
        order.updated_at = now_millis();

        self.storage.store_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::debug!(
            order_no = %order.order_no,
            version = order.version,
            events = kinds.len(),
            "Order mutation committed"
        );
        self.broadcast(
            kinds
                .into_iter()
                .map(|kind| LedgerEvent::new(&order.order_no, order.version, kind))
                .collect(),
        );
        Ok(order)
    }

    /// Broadcast events after a successful commit
    fn broadcast(&self, events: Vec<LedgerEvent>) {
        for event in events {
            if self.event_tx.send(event).is_err() {
                tracing::debug!("Event broadcast skipped: no active receivers");
                break;
            }
        }
    }
}

fn resolve_yard_ref(order: &Order, yard_ref: YardRef) -> Result<usize, ReconcileError> {
    let not_found = |reference: String| ReconcileError::YardNotFound {
        order_no: order.order_no.clone(),
        reference,
    };
    match yard_ref {
        YardRef::Id { id } => order
            .yard_index_of(id)
            .ok_or_else(|| not_found(format!("id {}", id))),
        YardRef::Index { index } => order
            .yard(index)
            .map(|_| index)
            .ok_or_else(|| not_found(format!("index {}", index))),
        YardRef::IndexChecked { index, id } => {
            let yard = order
                .yard(index)
                .ok_or_else(|| not_found(format!("index {}", index)))?;
            if yard.id != id {
                return Err(ReconcileError::StaleIndex {
                    index,
                    expected_id: id,
                    found_id: yard.id,
                });
            }
            Ok(index)
        }
    }
}

/// Validate every field first, then write; an invalid patch leaves `yard` untouched
fn apply_patch(yard: &mut YardAssignment, patch: YardPatch, now: i64) -> ManagerResult<()> {
    let amount = |value: Option<f64>, field: &'static str| -> Result<Option<f64>, ReconcileError> {
        value.map(|v| validate_amount(v, field)).transpose()
    };
    let part_price = amount(patch.part_price, "part_price")?;
    let other_charges = amount(patch.other_charges, "other_charges")?;
    let reimbursement = amount(patch.reimbursement_amount, "reimbursement_amount")?;
    let refunded = amount(patch.refunded_amount, "refunded_amount")?;
    let refund_to_collect = amount(patch.refund_to_collect, "refund_to_collect")?;
    let credit = amount(patch.store_credit, "store_credit")?;

    let shipping = match patch.shipping {
        Some(ShippingPatch::Cost(cost)) => Some(shipping::validate_cost(cost)?),
        Some(ShippingPatch::Fields {
            own_shipping,
            yard_shipping,
        }) => Some(shipping::from_fields(
            own_shipping.as_ref(),
            yard_shipping.as_ref(),
        )?),
        None => None,
    };

    if let Some(credit) = credit {
        let used = round(store_credit::used(yard));
        if to_decimal(credit) < used {
            return Err(ReconcileError::InvalidAmount {
                field: "store_credit",
                reason: format!("below credit already used ({})", used),
            }
            .into());
        }
    }

    if let Some(v) = patch.yard_name {
        let v = v.trim().to_string();
        if v.is_empty() {
            return Err(ManagerError::InvalidRequest(
                "yard name must not be blank".to_string(),
            ));
        }
        yard.yard_name = v;
    }
    if let Some(v) = patch.contact_name {
        yard.contact_name = Some(v);
    }
    if let Some(v) = patch.phone {
        yard.phone = Some(v);
    }
    if let Some(v) = patch.email {
        yard.email = Some(v);
    }
    if let Some(v) = patch.address {
        yard.address = Some(v);
    }
    if let Some(v) = part_price {
        yard.part_price = v;
        yard.clear_unparsed("part_price");
    }
    if let Some(v) = other_charges {
        yard.other_charges = v;
        yard.clear_unparsed("other_charges");
    }
    if let Some(v) = reimbursement {
        yard.reimbursement_amount = v;
        yard.clear_unparsed("reimbursement_amount");
    }
    if let Some(cost) = shipping {
        yard.shipping = Some(ShippingSpec::Structured(cost));
    }
    if let Some(v) = patch.payment_status {
        yard.payment_status = v;
    }
    if let Some(v) = patch.status {
        yard.status = v;
        if yard.is_escalated() && yard.escalation.is_none() {
            yard.escalation = Some(Escalation {
                opened_at: Some(now),
                ..Default::default()
            });
        }
    }
    if let Some(v) = patch.escalation {
        yard.escalation = Some(v);
    }
    if let Some(v) = refunded {
        yard.refunded_amount = v;
        yard.clear_unparsed("refunded_amount");
    }
    if let Some(v) = patch.collect_refund {
        yard.collect_refund = v;
    }
    if let Some(v) = refund_to_collect {
        yard.refund_to_collect = v;
        yard.clear_unparsed("refund_to_collect");
    }
    if let Some(v) = credit {
        yard.store_credit = (v > 0.0).then_some(v);
        yard.clear_unparsed("store_credit");
    }
    Ok(())
}

#[cfg(test)]
mod tests;

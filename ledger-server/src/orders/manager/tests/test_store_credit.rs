use super::*;

fn setup(credit: f64) -> OrdersManager {
    let manager = create_test_manager();
    create_credit_source(&manager, "S-1", credit);
    create_order(&manager, "T-1", OrderStatus::Placed);
    manager
}

#[test]
fn test_full_usage_drains_grant() {
    let manager = setup(30.0);

    let applied = manager
        .use_store_credit(usage_request("S-1", UsageKind::Full, None, "T-1"))
        .unwrap();
    assert_eq!(applied.usage.amount, 30.0);
    assert_eq!(applied.usage.order_no, "T-1");
    assert!(applied.usage.used_at.is_some());
    assert_eq!(applied.remaining, 0.0);

    let again = manager.use_store_credit(usage_request("S-1", UsageKind::Full, None, "T-1"));
    assert!(matches!(
        again,
        Err(ManagerError::Reconcile(ReconcileError::InsufficientCredit { .. }))
    ));
    assert_eq!(
        manager.store_credit_ledger().unwrap().remaining_for("S-1", 0),
        Some(0.0)
    );
}

#[test]
fn test_partial_usage_accumulates() {
    let manager = setup(30.0);

    let first = manager
        .use_store_credit(usage_request("S-1", UsageKind::Partial, Some(12.0), "T-1"))
        .unwrap();
    assert_eq!(first.remaining, 18.0);

    let second = manager
        .use_store_credit(usage_request("S-1", UsageKind::Partial, Some(18.0), "T-1"))
        .unwrap();
    assert_eq!(second.remaining, 0.0);

    let source = manager.get_order("S-1").unwrap().unwrap();
    let amounts: Vec<f64> = source.yard_assignments[0]
        .store_credit_used_for
        .iter()
        .map(|u| u.amount)
        .collect();
    assert_eq!(amounts, vec![12.0, 18.0]);
}

#[test]
fn test_overdraw_leaves_grant_unchanged() {
    let manager = setup(30.0);
    let before = manager.get_order("S-1").unwrap().unwrap();

    let result =
        manager.use_store_credit(usage_request("S-1", UsageKind::Partial, Some(40.0), "T-1"));
    assert!(matches!(
        result,
        Err(ManagerError::Reconcile(ReconcileError::InsufficientCredit {
            requested,
            remaining,
        })) if requested == 40.0 && remaining == 30.0
    ));
    assert_eq!(manager.get_order("S-1").unwrap(), Some(before));
}

#[test]
fn test_invalid_partial_amounts() {
    let manager = setup(30.0);

    for amount in [None, Some(0.0), Some(-5.0)] {
        let result =
            manager.use_store_credit(usage_request("S-1", UsageKind::Partial, amount, "T-1"));
        assert!(
            matches!(
                result,
                Err(ManagerError::Reconcile(ReconcileError::InvalidAmount { .. }))
            ),
            "amount {:?} should be rejected",
            amount
        );
    }
    assert_eq!(
        manager.store_credit_ledger().unwrap().remaining_for("S-1", 0),
        Some(30.0)
    );
}

#[test]
fn test_target_must_exist() {
    let manager = setup(30.0);

    let result = manager.use_store_credit(usage_request("S-1", UsageKind::Full, None, "X-9"));
    assert!(matches!(result, Err(ManagerError::OrderNotFound(no)) if no == "X-9"));

    let blank = manager.use_store_credit(usage_request("S-1", UsageKind::Full, None, "  "));
    assert!(matches!(
        blank,
        Err(ManagerError::Reconcile(ReconcileError::InvalidAmount { field: "target_order_no", .. }))
    ));
}

#[test]
fn test_credit_may_be_spent_on_its_own_order() {
    let manager = setup(30.0);
    let applied = manager
        .use_store_credit(usage_request("S-1", UsageKind::Partial, Some(5.0), "S-1"))
        .unwrap();
    assert_eq!(applied.remaining, 25.0);
}

#[test]
fn test_grant_lookup() {
    let manager = setup(30.0);

    let missing = manager.use_store_credit(StoreCreditUsageRequest {
        grant_index: 4,
        ..usage_request("S-1", UsageKind::Full, None, "T-1")
    });
    assert!(matches!(
        missing,
        Err(ManagerError::Reconcile(ReconcileError::GrantNotFound { index: 4, .. }))
    ));

    // A yard without credit is not a grant.
    create_order(&manager, "P-1", OrderStatus::YardProcessing);
    manager.add_yard("P-1", new_yard(50.0, 5.0)).unwrap();
    let not_grant = manager.use_store_credit(usage_request("P-1", UsageKind::Full, None, "T-1"));
    assert!(matches!(
        not_grant,
        Err(ManagerError::Reconcile(ReconcileError::GrantNotFound { index: 0, .. }))
    ));

    assert!(matches!(
        manager.use_store_credit(usage_request("nope", UsageKind::Full, None, "T-1")),
        Err(ManagerError::OrderNotFound(_))
    ));
}

#[test]
fn test_usage_publishes_event() {
    let manager = setup(30.0);
    let mut rx = manager.subscribe();

    manager
        .use_store_credit(usage_request("S-1", UsageKind::Partial, Some(10.0), "T-1"))
        .unwrap();

    let event = rx.try_recv().unwrap();
    assert_eq!(event.order_no, "S-1");
    assert_eq!(
        event.kind,
        LedgerEventKind::StoreCreditUsed {
            grant_index: 0,
            amount: 10.0,
            target_order_no: "T-1".to_string(),
            remaining: 20.0,
        }
    );
}

#[test]
fn test_credit_cannot_drop_below_used() {
    let manager = setup(30.0);
    manager
        .use_store_credit(usage_request("S-1", UsageKind::Partial, Some(20.0), "T-1"))
        .unwrap();

    let lower = YardPatch {
        store_credit: Some(15.0),
        ..Default::default()
    };
    assert!(matches!(
        manager.update_yard("S-1", YardRef::Id { id: 1 }, lower, None),
        Err(ManagerError::Reconcile(ReconcileError::InvalidAmount { field: "store_credit", .. }))
    ));

    let raise = YardPatch {
        store_credit: Some(45.0),
        ..Default::default()
    };
    manager
        .update_yard("S-1", YardRef::Id { id: 1 }, raise, None)
        .unwrap();
    assert_eq!(
        manager.store_credit_ledger().unwrap().remaining_for("S-1", 0),
        Some(25.0)
    );
}

#[test]
fn test_ledger_conserves_credit() {
    let manager = setup(30.0);
    create_credit_source(&manager, "S-2", 50.0);
    manager
        .use_store_credit(usage_request("S-1", UsageKind::Partial, Some(7.5), "T-1"))
        .unwrap();
    manager
        .use_store_credit(usage_request("S-2", UsageKind::Full, None, "T-1"))
        .unwrap();

    let ledger = manager.store_credit_ledger().unwrap();
    assert_eq!(ledger.total_issued(), 80.0);
    assert_eq!(ledger.total_remaining(), 22.5);

    let yard = ledger.yard("North Yard").unwrap();
    assert_eq!(yard.grants.len(), 2);
    assert_eq!(yard.total_issued, yard.total_used + yard.total_remaining);
    assert!(ledger.warnings().is_empty());
}

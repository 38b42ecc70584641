use super::*;
use shared::order::{PaymentStatus, RawAmount, ShippingCost, UsageKind};

fn create_test_manager() -> OrdersManager {
    let storage = OrderStorage::open_in_memory().unwrap();
    OrdersManager::with_storage(storage, DEFAULT_EVENT_CHANNEL_CAPACITY)
}

fn create_order(manager: &OrdersManager, order_no: &str, status: OrderStatus) -> Order {
    manager
        .create_order(NewOrder {
            order_no: order_no.to_string(),
            order_status: status,
            sold_price: 300.0,
            sales_tax: 10.0,
        })
        .unwrap()
}

fn new_yard(part_price: f64, yard_shipping: f64) -> NewYard {
    NewYard {
        yard_name: "North Yard".to_string(),
        part_price,
        yard_shipping: Some(RawAmount::Number(yard_shipping)),
        ..Default::default()
    }
}

fn charge_patch() -> YardPatch {
    YardPatch {
        payment_status: Some(PaymentStatus::CardCharged),
        ..Default::default()
    }
}

fn status_patch(status: &str) -> YardPatch {
    YardPatch {
        status: Some(status.to_string()),
        ..Default::default()
    }
}

/// Order with one PO-cancelled yard carrying a store-credit grant at index 0
fn create_credit_source(manager: &OrdersManager, order_no: &str, credit: f64) -> Order {
    create_order(manager, order_no, OrderStatus::YardProcessing);
    manager.add_yard(order_no, new_yard(100.0, 20.0)).unwrap();
    manager
        .update_yard(
            order_no,
            YardRef::Index { index: 0 },
            YardPatch {
                status: Some("PO cancelled".to_string()),
                refunded_amount: Some(credit),
                store_credit: Some(credit),
                ..Default::default()
            },
            None,
        )
        .unwrap()
}

fn usage_request(
    source: &str,
    kind: UsageKind,
    amount: Option<f64>,
    target: &str,
) -> StoreCreditUsageRequest {
    StoreCreditUsageRequest {
        source_order_no: source.to_string(),
        grant_index: 0,
        usage_type: kind,
        amount,
        target_order_no: target.to_string(),
    }
}

mod test_store_credit;

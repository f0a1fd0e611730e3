// Status transition table exercised through the purchase order service
//
// Every (current, requested) pair among the five states is attempted against a
// stored order; exactly five succeed and the rest fail with InvalidTransition
// while leaving the stored status alone.

use rust_decimal_macros::dec;

#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::*;
use procuretrack::purchase_orders::{NewPurchaseOrder, OrderStatus};
use procuretrack::AppError;

/// Path from PENDING to each state
fn path_to(status: OrderStatus) -> &'static [OrderStatus] {
    match status {
        OrderStatus::Pending => &[],
        OrderStatus::Approved => &[OrderStatus::Approved],
        OrderStatus::Shipped => &[OrderStatus::Approved, OrderStatus::Shipped],
        OrderStatus::Delivered => &[
            OrderStatus::Approved,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ],
        OrderStatus::Cancelled => &[OrderStatus::Cancelled],
    }
}

const ALLOWED: [(OrderStatus, OrderStatus); 5] = [
    (OrderStatus::Pending, OrderStatus::Approved),
    (OrderStatus::Pending, OrderStatus::Cancelled),
    (OrderStatus::Approved, OrderStatus::Shipped),
    (OrderStatus::Approved, OrderStatus::Cancelled),
    (OrderStatus::Shipped, OrderStatus::Delivered),
];

#[tokio::test]
async fn test_exactly_five_transitions_are_allowed() {
    let services = memory_services().await;
    let mut succeeded = 0;
    let mut rejected = 0;

    for current in OrderStatus::ALL {
        for requested in OrderStatus::ALL {
            let order = services
                .orders
                .create(NewPurchaseOrder::new(1, 1))
                .await
                .unwrap();
            for step in path_to(current) {
                services
                    .orders
                    .change_status(order.id, *step, None)
                    .await
                    .unwrap();
            }

            let result = services
                .orders
                .change_status(order.id, requested, None)
                .await;
            let stored = services.orders.get(order.id).await.unwrap();

            if ALLOWED.contains(&(current, requested)) {
                let updated = result.unwrap_or_else(|e| {
                    panic!("{} -> {} should be allowed: {}", current, requested, e)
                });
                assert_eq!(updated.status, requested);
                assert_eq!(stored.status, requested);
                succeeded += 1;
            } else {
                match result {
                    Err(AppError::InvalidTransition {
                        current: reported_current,
                        requested: reported_requested,
                    }) => {
                        assert_eq!(reported_current, current);
                        assert_eq!(reported_requested, requested);
                    }
                    other => panic!(
                        "{} -> {} should be rejected, got {:?}",
                        current, requested, other
                    ),
                }
                assert_eq!(stored.status, current);
                rejected += 1;
            }
        }
    }

    assert_eq!(succeeded, 5);
    assert_eq!(rejected, 20);
}

#[tokio::test]
async fn test_change_status_on_missing_order() {
    let services = memory_services().await;

    let err = services
        .orders
        .change_status(12345, OrderStatus::Approved, None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_cancel_only_before_shipping() {
    let services = memory_services().await;

    let pending = services.order_with_lines(1, &[(1, dec!(1))]).await;
    let cancelled = services.orders.cancel(pending.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    let approved = services.order_with_lines(1, &[(1, dec!(1))]).await;
    services.orders.approve(approved.id).await.unwrap();
    assert_eq!(
        services.orders.cancel(approved.id).await.unwrap().status,
        OrderStatus::Cancelled
    );

    let shipped = services.order_with_lines(1, &[(1, dec!(1))]).await;
    services.orders.approve(shipped.id).await.unwrap();
    services.orders.ship(shipped.id).await.unwrap();
    let err = services.orders.cancel(shipped.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));
}

#[test]
fn test_status_names_parse_case_insensitively() {
    assert_eq!("approved".parse::<OrderStatus>().unwrap(), OrderStatus::Approved);
    assert_eq!("Shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);

    let err = "RETURNED".parse::<OrderStatus>().unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

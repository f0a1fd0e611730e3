// Integration tests for the supplier directory and the audit trail
//
// Orders reference suppliers by id; the directory decides which ids may take
// new orders.

use rust_decimal_macros::dec;
use std::sync::Arc;

#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::*;
use procuretrack::core::{Role, User};
use procuretrack::purchase_orders::{NewPurchaseOrder, OrderStatus, PurchaseOrderUpdate};
use procuretrack::suppliers::{NewSupplier, SupplierStatus};
use procuretrack::{AppError, MemoryStore};

#[tokio::test]
async fn test_register_list_and_deactivate() {
    let services = Services::over(Arc::new(MemoryStore::new()));

    let widgets = services
        .suppliers
        .create(
            NewSupplier::new("Widgets Inc")
                .contact("Dana")
                .phone("+1 555 0100")
                .address("1 Industrial Way"),
        )
        .await
        .unwrap();
    let acme = services.supplier("Acme").await;

    assert_eq!(widgets.contact_name.as_deref(), Some("Dana"));
    assert_eq!(widgets.status, SupplierStatus::Active);

    let names: Vec<String> = services
        .suppliers
        .list_active()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["Acme", "Widgets Inc"]);

    services.suppliers.deactivate(acme.id).await.unwrap();
    let active = services.suppliers.list_active().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, widgets.id);
    assert_eq!(
        services.suppliers.get(acme.id).await.unwrap().status,
        SupplierStatus::Inactive
    );
}

#[tokio::test]
async fn test_orders_need_an_active_registered_supplier() {
    let services = Services::over(Arc::new(MemoryStore::new()));

    let err = services
        .orders
        .create(NewPurchaseOrder::new(1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let acme = services.supplier("Acme").await;
    let order = services.order_with_lines(acme.id, &[(1, dec!(5))]).await;

    services.suppliers.deactivate(acme.id).await.unwrap();
    let err = services
        .orders
        .create(NewPurchaseOrder::new(acme.id, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    // Existing orders keep moving
    services.orders.approve(order.id).await.unwrap();
    assert_eq!(
        services.orders.get(order.id).await.unwrap().status,
        OrderStatus::Approved
    );
}

#[tokio::test]
async fn test_update_details_to_unknown_or_inactive_supplier() {
    let services = Services::over(Arc::new(MemoryStore::new()));
    let acme = services.supplier("Acme").await;
    let closed = services.supplier("Closed Co").await;
    services.suppliers.deactivate(closed.id).await.unwrap();
    let order = services.order_with_lines(acme.id, &[]).await;

    let move_to = |supplier_id| PurchaseOrderUpdate {
        supplier_id: Some(supplier_id),
        ..Default::default()
    };

    let err = services
        .orders
        .update_details(order.id, move_to(999))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = services
        .orders
        .update_details(order.id, move_to(closed.id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    assert_eq!(services.orders.get(order.id).await.unwrap().supplier_id, acme.id);
}

#[tokio::test]
async fn test_actions_on_behalf_of_users_form_an_audit_trail() {
    let services = memory_services().await;
    let cashier = User::new(3, "till", Role::Cashier);
    let manager = User::new(12, "mgr", Role::Manager);

    let order = services
        .orders
        .create_as(&cashier, NewPurchaseOrder::new(7, 3))
        .await
        .unwrap();
    services
        .orders
        .add_item_as(&cashier, order.id, 1, 2, dec!(10))
        .await
        .unwrap();
    services
        .orders
        .change_status_as(&manager, order.id, OrderStatus::Approved)
        .await
        .unwrap();
    let invoice = services
        .invoices
        .create_from_order_as(&manager, order.id, invoice_details("INV-AUD"))
        .await
        .unwrap();
    services
        .payments
        .record_as(&cashier, invoice.id, dec!(20), None)
        .await
        .unwrap();
    services.ledger.supplier_balance_as(&manager, 7).await.unwrap();

    let own = services.audit.list_for_user(&cashier, 3, 50).await.unwrap();
    assert_eq!(own.len(), 3);
    assert!(own[0].action.starts_with("payment"));
    assert!(own[2].action.contains("created for supplier 7"));

    let theirs = services
        .audit
        .list_for_user(&cashier, 12, 50)
        .await
        .unwrap_err();
    assert!(matches!(theirs, AppError::Unauthorized(_)));

    let admin = User::new(1, "root", Role::Admin);
    let everything = services.audit.recent(&admin, 50).await.unwrap();
    assert_eq!(everything.len(), 6);
    assert!(everything[0].action.contains("balance viewed"));
}

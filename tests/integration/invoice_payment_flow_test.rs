// Integration tests for invoicing and the payments ledger

use rust_decimal_macros::dec;

#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::*;
use procuretrack::core::traits::{Store, UnitOfWork};
use procuretrack::invoices::repositories::InvoiceRepository;
use procuretrack::invoices::InvoiceStatus;
use procuretrack::payments::PaymentMethod;
use procuretrack::AppError;

#[tokio::test]
async fn test_invoice_then_two_payments() {
    let services = memory_services().await;
    let order = services
        .order_with_lines(7, &[(2, dec!(10.00)), (1, dec!(5.00))])
        .await;

    let invoice = services
        .invoices
        .create_from_order(order.id, invoice_details("INV-2026-001"))
        .await
        .unwrap();
    assert_eq!(invoice.total_amount.to_string(), "25.00");
    assert_eq!(invoice.paid_amount.to_string(), "0.00");
    assert_eq!(invoice.status, InvoiceStatus::Unpaid);
    assert_eq!(invoice.order_id, Some(order.id));
    assert_eq!(invoice.supplier_id, Some(7));

    let view = services.invoices.get_with_balance(invoice.id).await.unwrap();
    assert_eq!(view.remaining, view.invoice.total_amount);

    services
        .payments
        .record(invoice.id, dec!(10.00), None)
        .await
        .unwrap();
    let view = services.invoices.get_with_balance(invoice.id).await.unwrap();
    assert_eq!(view.invoice.status, InvoiceStatus::PartiallyPaid);
    assert_eq!(view.invoice.paid_amount, dec!(10.00));
    assert_eq!(view.remaining.to_string(), "15.00");

    services
        .payments
        .record(invoice.id, "15", Some(PaymentMethod::Cheque))
        .await
        .unwrap();
    let view = services.invoices.get_with_balance(invoice.id).await.unwrap();
    assert_eq!(view.invoice.status, InvoiceStatus::Paid);
    assert_eq!(view.remaining.to_string(), "0.00");
}

#[tokio::test]
async fn test_invoice_total_is_a_snapshot() {
    let services = memory_services().await;
    let order = services.order_with_lines(1, &[(1, dec!(40))]).await;

    let invoice = services
        .invoices
        .create_from_order(order.id, invoice_details("INV-SNAP"))
        .await
        .unwrap();

    services.orders.add_item(order.id, 2, 1, dec!(60)).await.unwrap();

    assert_eq!(services.orders.get(order.id).await.unwrap().total_amount, dec!(100.00));
    assert_eq!(services.invoices.get(invoice.id).await.unwrap().total_amount, dec!(40.00));
}

#[tokio::test]
async fn test_invoice_for_empty_order_is_zero() {
    let services = memory_services().await;
    let order = services.order_with_lines(1, &[]).await;

    let invoice = services
        .invoices
        .create_from_order(order.id, invoice_details("INV-ZERO"))
        .await
        .unwrap();

    assert_eq!(invoice.total_amount.to_string(), "0.00");
    assert_eq!(invoice.status, InvoiceStatus::Unpaid);
    assert_eq!(
        services.invoices.find_by_order(order.id).await.unwrap(),
        Some(invoice)
    );
}

#[tokio::test]
async fn test_invoice_details_are_validated() {
    let services = memory_services().await;
    let order = services.order_with_lines(1, &[(1, dec!(1))]).await;

    let err = services
        .invoices
        .create_from_order(order.id, invoice_details("   "))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let early_due = invoice_details("INV-DUE").due_on(invoice_date().pred_opt().unwrap());
    let err = services
        .invoices
        .create_from_order(order.id, early_due)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    assert!(services.invoices.find_by_order(order.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_missing_invoice() {
    let services = memory_services().await;

    assert!(matches!(
        services.invoices.get_with_balance(77).await.unwrap_err(),
        AppError::NotFound(_)
    ));
    assert!(matches!(
        services.payments.record(77, dec!(1), None).await.unwrap_err(),
        AppError::NotFound(_)
    ));
    assert!(matches!(
        services.payments.list_for_invoice(77).await.unwrap_err(),
        AppError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_invalid_payment_amounts_write_nothing() {
    let services = memory_services().await;
    let invoice = services.invoice_worth(1, "INV-BAD", dec!(50)).await;

    for amount in ["0", "-10", "fifty"] {
        let err = services
            .payments
            .record(invoice.id, amount, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "{}", amount);
    }

    assert!(services
        .payments
        .list_for_invoice(invoice.id)
        .await
        .unwrap()
        .is_empty());
    let view = services.invoices.get_with_balance(invoice.id).await.unwrap();
    assert_eq!(view.invoice.status, InvoiceStatus::Unpaid);
    assert_eq!(view.remaining, dec!(50.00));
}

#[tokio::test]
async fn test_payments_listed_newest_first() {
    let services = memory_services().await;
    let invoice = services.invoice_worth(1, "INV-LIST", dec!(100)).await;

    let first = services
        .payments
        .record(invoice.id, dec!(10), None)
        .await
        .unwrap();
    let second = services
        .payments
        .record(invoice.id, dec!(20), Some(PaymentMethod::Cash))
        .await
        .unwrap();

    let listed = services.payments.list_for_invoice(invoice.id).await.unwrap();
    let ids: Vec<i64> = listed.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert_eq!(listed[0].method, PaymentMethod::Cash);
    assert_eq!(listed[1].method, PaymentMethod::BankTransfer);
}

#[tokio::test]
async fn test_ledger_wins_over_drifted_cache() {
    let services = memory_services().await;
    let invoice = services.invoice_worth(1, "INV-DRIFT", dec!(100)).await;
    services
        .payments
        .record(invoice.id, dec!(30), None)
        .await
        .unwrap();

    // Corrupt the cached paid amount behind the services' back
    let mut uow = services.store.begin().await.unwrap();
    uow.update_invoice_payment(invoice.id, dec!(95), InvoiceStatus::PartiallyPaid)
        .await
        .unwrap();
    uow.commit().await.unwrap();

    let view = services.invoices.get_with_balance(invoice.id).await.unwrap();
    assert_eq!(view.invoice.paid_amount, dec!(30.00));
    assert_eq!(view.remaining, dec!(70.00));

    // Next payment is computed from the ledger, not the cache
    services
        .payments
        .record(invoice.id, dec!(20), None)
        .await
        .unwrap();
    let stored = services.invoices.get(invoice.id).await.unwrap();
    assert_eq!(stored.paid_amount, dec!(50.00));
    assert_eq!(stored.status, InvoiceStatus::PartiallyPaid);

    let mut uow = services.store.begin().await.unwrap();
    uow.update_invoice_payment(invoice.id, dec!(0), InvoiceStatus::Unpaid)
        .await
        .unwrap();
    uow.commit().await.unwrap();

    let reconciled = services.payments.reconcile(invoice.id).await.unwrap();
    assert_eq!(reconciled.paid_amount, dec!(50.00));
    assert_eq!(reconciled.status, InvoiceStatus::PartiallyPaid);
    assert_eq!(services.invoices.get(invoice.id).await.unwrap(), reconciled);
}

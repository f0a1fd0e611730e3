// Fixtures wiring every service onto one shared store

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;

use procuretrack::audit::AuditService;
use procuretrack::core::traits::Store;
use procuretrack::invoices::{Invoice, InvoiceService, NewInvoice};
use procuretrack::ledger::SupplierLedgerService;
use procuretrack::payments::PaymentService;
use procuretrack::purchase_orders::{NewPurchaseOrder, PurchaseOrder, PurchaseOrderService};
use procuretrack::suppliers::{NewSupplier, Supplier, SupplierService};
use procuretrack::MemoryStore;

/// All services over one store
pub struct Services<S: Store> {
    pub store: Arc<S>,
    pub suppliers: SupplierService<S>,
    pub orders: PurchaseOrderService<S>,
    pub invoices: InvoiceService<S>,
    pub payments: PaymentService<S>,
    pub ledger: SupplierLedgerService<S>,
    pub audit: AuditService<S>,
}

impl<S: Store> Services<S> {
    pub fn over(store: Arc<S>) -> Self {
        Self {
            suppliers: SupplierService::new(Arc::clone(&store)),
            orders: PurchaseOrderService::new(Arc::clone(&store)),
            invoices: InvoiceService::new(Arc::clone(&store)),
            payments: PaymentService::new(Arc::clone(&store)),
            ledger: SupplierLedgerService::new(Arc::clone(&store)),
            audit: AuditService::new(Arc::clone(&store)),
            store,
        }
    }

    pub async fn supplier(&self, name: &str) -> Supplier {
        self.suppliers
            .create(NewSupplier::new(name))
            .await
            .expect("create supplier")
    }

    /// Order with one line per `(quantity, unit_price)` pair
    pub async fn order_with_lines(
        &self,
        supplier_id: i64,
        lines: &[(i32, Decimal)],
    ) -> PurchaseOrder {
        let order = self
            .orders
            .create(NewPurchaseOrder::new(supplier_id, 1))
            .await
            .expect("create order");

        for (n, (quantity, price)) in lines.iter().enumerate() {
            self.orders
                .add_item(order.id, 100 + n as i64, *quantity, *price)
                .await
                .expect("add item");
        }

        self.orders.get(order.id).await.expect("reload order")
    }

    /// Invoice for a fresh single-line order worth `total`
    pub async fn invoice_worth(
        &self,
        supplier_id: i64,
        number: &str,
        total: Decimal,
    ) -> Invoice {
        let order = self.order_with_lines(supplier_id, &[(1, total)]).await;
        self.invoices
            .create_from_order(order.id, invoice_details(number))
            .await
            .expect("create invoice")
    }
}

/// Suppliers registered by `memory_services`, with ids `1..=SEEDED_SUPPLIERS`
pub const SEEDED_SUPPLIERS: i64 = 50;

/// Services over a fresh memory store with a seeded supplier directory
pub async fn memory_services() -> Services<MemoryStore> {
    let services = Services::over(Arc::new(MemoryStore::new()));
    for n in 1..=SEEDED_SUPPLIERS {
        services.supplier(&format!("Supplier {:02}", n)).await;
    }
    services
}

pub fn invoice_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 5, 1).expect("valid date")
}

pub fn invoice_details(number: &str) -> NewInvoice {
    NewInvoice::new(number, invoice_date())
}

// In-memory backend for tests and embedding.
//
// A unit of work holds the store's async mutex for its whole lifetime and
// mutates a private copy of the state; `commit` swaps the copy in. Dropping
// the unit of work without committing leaves the shared state untouched.
//
// The relational constraints of the MySQL schema are mirrored here: unique
// invoice numbers, one invoice per order, order -> supplier, item -> order and
// payment -> invoice references, cascading item deletes and detaching
// invoices from a deleted order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::core::money;
use crate::core::traits::{Store, UnitOfWork};
use crate::core::{
    AppError, InvoiceId, ItemId, OrderId, PaymentId, Result, SupplierId, UserId,
};
use crate::modules::audit::{AuditEntry, AuditRepository};
use crate::modules::invoices::models::{Invoice, InvoiceDraft, InvoiceStatus};
use crate::modules::invoices::repositories::InvoiceRepository;
use crate::modules::ledger::models::SupplierBalance;
use crate::modules::ledger::repositories::LedgerRepository;
use crate::modules::payments::models::{NewPayment, Payment};
use crate::modules::payments::repositories::PaymentRepository;
use crate::modules::purchase_orders::models::{
    NewPurchaseOrder, OrderLineItem, OrderStatus, PurchaseOrder,
};
use crate::modules::purchase_orders::repositories::{LineItemRepository, PurchaseOrderRepository};
use crate::modules::suppliers::models::{NewSupplier, Supplier, SupplierStatus};
use crate::modules::suppliers::repositories::SupplierRepository;

#[derive(Debug, Clone, Default)]
struct MemoryState {
    suppliers: BTreeMap<SupplierId, Supplier>,
    orders: BTreeMap<OrderId, PurchaseOrder>,
    items: BTreeMap<ItemId, OrderLineItem>,
    invoices: BTreeMap<InvoiceId, Invoice>,
    payments: BTreeMap<PaymentId, Payment>,
    audit: Vec<AuditEntry>,
    last_supplier_id: i64,
    last_order_id: i64,
    last_item_id: i64,
    last_invoice_id: i64,
    last_payment_id: i64,
    last_audit_id: i64,
}

fn next_id(last: &mut i64) -> i64 {
    *last += 1;
    *last
}

/// Σ without panicking; MySQL would report the same as an out-of-range value
fn checked_sum(values: impl IntoIterator<Item = Option<Decimal>>) -> Result<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| value.and_then(|v| acc.checked_add(v)))
        .map(money::quantize)
        .ok_or_else(|| AppError::validation("amount out of range"))
}

/// Storage handle keeping everything in process memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A unit of work over a private copy of the in-memory state
pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl Store for MemoryStore {
    type Uow = MemoryUnitOfWork;

    async fn begin(&self) -> Result<MemoryUnitOfWork> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();

        Ok(MemoryUnitOfWork { guard, working })
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn commit(self) -> Result<()> {
        let MemoryUnitOfWork { mut guard, working } = self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        Ok(())
    }
}

impl MemoryUnitOfWork {
    fn check_supplier_reference(&self, supplier_id: SupplierId, context: &str) -> Result<()> {
        if !self.working.suppliers.contains_key(&supplier_id) {
            return Err(AppError::storage(format!(
                "{}: foreign key constraint fails (supplier {})",
                context, supplier_id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl SupplierRepository for MemoryUnitOfWork {
    async fn insert_supplier(
        &mut self,
        supplier: &NewSupplier,
        created_at: DateTime<Utc>,
    ) -> Result<SupplierId> {
        let id = next_id(&mut self.working.last_supplier_id);
        self.working
            .suppliers
            .insert(id, supplier.clone().into_supplier(id, created_at));
        Ok(id)
    }

    async fn find_supplier(&mut self, id: SupplierId) -> Result<Option<Supplier>> {
        Ok(self.working.suppliers.get(&id).cloned())
    }

    async fn list_active_suppliers(&mut self) -> Result<Vec<Supplier>> {
        let mut suppliers: Vec<Supplier> = self
            .working
            .suppliers
            .values()
            .filter(|s| s.status == SupplierStatus::Active)
            .cloned()
            .collect();
        suppliers.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(suppliers)
    }

    async fn set_supplier_status(
        &mut self,
        id: SupplierId,
        status: SupplierStatus,
    ) -> Result<u64> {
        Ok(match self.working.suppliers.get_mut(&id) {
            Some(supplier) => {
                supplier.status = status;
                1
            }
            None => 0,
        })
    }
}

#[async_trait]
impl PurchaseOrderRepository for MemoryUnitOfWork {
    async fn insert_order(
        &mut self,
        order: &NewPurchaseOrder,
        order_date: DateTime<Utc>,
    ) -> Result<OrderId> {
        self.check_supplier_reference(order.supplier_id, "Failed to create purchase order")?;

        let id = next_id(&mut self.working.last_order_id);
        self.working
            .orders
            .insert(id, order.clone().into_order(id, order_date));
        Ok(id)
    }

    async fn find_order(&mut self, id: OrderId) -> Result<Option<PurchaseOrder>> {
        Ok(self.working.orders.get(&id).cloned())
    }

    async fn lock_order(&mut self, id: OrderId) -> Result<Option<PurchaseOrder>> {
        self.find_order(id).await
    }

    async fn list_orders_by_supplier(
        &mut self,
        supplier_id: SupplierId,
    ) -> Result<Vec<PurchaseOrder>> {
        let mut orders: Vec<PurchaseOrder> = self
            .working
            .orders
            .values()
            .filter(|o| o.supplier_id == supplier_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.order_date.cmp(&a.order_date).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn update_order_status(&mut self, id: OrderId, status: OrderStatus) -> Result<u64> {
        Ok(match self.working.orders.get_mut(&id) {
            Some(order) => {
                order.status = status;
                1
            }
            None => 0,
        })
    }

    async fn update_order_details(&mut self, order: &PurchaseOrder) -> Result<u64> {
        self.check_supplier_reference(order.supplier_id, "Failed to update purchase order")?;

        Ok(match self.working.orders.get_mut(&order.id) {
            Some(stored) => {
                stored.supplier_id = order.supplier_id;
                stored.expected_delivery_date = order.expected_delivery_date;
                1
            }
            None => 0,
        })
    }

    async fn set_order_total(&mut self, id: OrderId, total: Decimal) -> Result<u64> {
        Ok(match self.working.orders.get_mut(&id) {
            Some(order) => {
                order.total_amount = money::quantize(total);
                1
            }
            None => 0,
        })
    }

    async fn delete_order(&mut self, id: OrderId) -> Result<u64> {
        if self.working.orders.remove(&id).is_none() {
            return Ok(0);
        }

        self.working.items.retain(|_, item| item.order_id != id);
        for invoice in self.working.invoices.values_mut() {
            if invoice.order_id == Some(id) {
                invoice.order_id = None;
            }
        }

        Ok(1)
    }
}

#[async_trait]
impl LineItemRepository for MemoryUnitOfWork {
    async fn insert_item(&mut self, item: &OrderLineItem) -> Result<ItemId> {
        if !self.working.orders.contains_key(&item.order_id) {
            return Err(AppError::storage(format!(
                "Failed to create line item: foreign key constraint fails (order {})",
                item.order_id
            )));
        }

        let id = next_id(&mut self.working.last_item_id);
        let mut stored = item.clone();
        stored.id = Some(id);
        self.working.items.insert(id, stored);
        Ok(id)
    }

    async fn find_item(
        &mut self,
        order_id: OrderId,
        item_id: ItemId,
    ) -> Result<Option<OrderLineItem>> {
        Ok(self
            .working
            .items
            .get(&item_id)
            .filter(|item| item.order_id == order_id)
            .cloned())
    }

    async fn update_item_pricing(&mut self, item: &OrderLineItem) -> Result<u64> {
        let Some(id) = item.id else {
            return Ok(0);
        };

        Ok(match self.working.items.get_mut(&id) {
            Some(stored) if stored.order_id == item.order_id => {
                stored.discount = item.discount;
                stored.tax_rate = item.tax_rate;
                stored.updated_at = item.updated_at;
                1
            }
            _ => 0,
        })
    }

    async fn delete_item(&mut self, order_id: OrderId, item_id: ItemId) -> Result<u64> {
        let belongs = self
            .working
            .items
            .get(&item_id)
            .is_some_and(|item| item.order_id == order_id);

        if !belongs {
            return Ok(0);
        }

        self.working.items.remove(&item_id);
        Ok(1)
    }

    async fn list_items(&mut self, order_id: OrderId) -> Result<Vec<OrderLineItem>> {
        Ok(self
            .working
            .items
            .values()
            .filter(|item| item.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn sum_item_value(&mut self, order_id: OrderId) -> Result<Decimal> {
        checked_sum(
            self.working
                .items
                .values()
                .filter(|item| item.order_id == order_id)
                .map(|item| Decimal::from(item.quantity).checked_mul(item.unit_price)),
        )
    }
}

#[async_trait]
impl InvoiceRepository for MemoryUnitOfWork {
    async fn insert_invoice(&mut self, draft: &InvoiceDraft) -> Result<InvoiceId> {
        let duplicate_number = self
            .working
            .invoices
            .values()
            .any(|inv| inv.invoice_number == draft.invoice_number);
        if duplicate_number {
            return Err(AppError::storage(format!(
                "Failed to create invoice: duplicate entry '{}' for invoice_number",
                draft.invoice_number
            )));
        }

        let duplicate_order = self
            .working
            .invoices
            .values()
            .any(|inv| inv.order_id == Some(draft.order_id));
        if duplicate_order {
            return Err(AppError::storage(format!(
                "Failed to create invoice: duplicate entry '{}' for order_id",
                draft.order_id
            )));
        }

        if !self.working.orders.contains_key(&draft.order_id) {
            return Err(AppError::storage(format!(
                "Failed to create invoice: foreign key constraint fails (order {})",
                draft.order_id
            )));
        }

        let id = next_id(&mut self.working.last_invoice_id);
        self.working
            .invoices
            .insert(id, draft.clone().into_invoice(id));
        Ok(id)
    }

    async fn find_invoice(&mut self, id: InvoiceId) -> Result<Option<Invoice>> {
        Ok(self.working.invoices.get(&id).cloned())
    }

    async fn lock_invoice(&mut self, id: InvoiceId) -> Result<Option<Invoice>> {
        self.find_invoice(id).await
    }

    async fn find_invoice_by_order(&mut self, order_id: OrderId) -> Result<Option<Invoice>> {
        Ok(self
            .working
            .invoices
            .values()
            .find(|inv| inv.order_id == Some(order_id))
            .cloned())
    }

    async fn update_invoice_payment(
        &mut self,
        id: InvoiceId,
        paid_amount: Decimal,
        status: InvoiceStatus,
    ) -> Result<u64> {
        Ok(match self.working.invoices.get_mut(&id) {
            Some(invoice) => {
                invoice.paid_amount = money::quantize(paid_amount);
                invoice.status = status;
                1
            }
            None => 0,
        })
    }
}

#[async_trait]
impl PaymentRepository for MemoryUnitOfWork {
    async fn insert_payment(&mut self, payment: &NewPayment) -> Result<PaymentId> {
        if !self.working.invoices.contains_key(&payment.invoice_id) {
            return Err(AppError::storage(format!(
                "Failed to record payment: foreign key constraint fails (invoice {})",
                payment.invoice_id
            )));
        }

        let id = next_id(&mut self.working.last_payment_id);
        self.working
            .payments
            .insert(id, payment.clone().into_payment(id));
        Ok(id)
    }

    async fn list_payments(&mut self, invoice_id: InvoiceId) -> Result<Vec<Payment>> {
        let mut payments: Vec<Payment> = self
            .working
            .payments
            .values()
            .filter(|p| p.invoice_id == invoice_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| {
            b.payment_date
                .cmp(&a.payment_date)
                .then(b.id.cmp(&a.id))
        });
        Ok(payments)
    }

    async fn sum_payments(&mut self, invoice_id: InvoiceId) -> Result<Decimal> {
        checked_sum(
            self.working
                .payments
                .values()
                .filter(|p| p.invoice_id == invoice_id)
                .map(|p| Some(p.amount)),
        )
    }
}

#[async_trait]
impl LedgerRepository for MemoryUnitOfWork {
    async fn supplier_totals(&mut self, supplier_id: SupplierId) -> Result<SupplierBalance> {
        let invoices: Vec<&Invoice> = self
            .working
            .invoices
            .values()
            .filter(|inv| inv.supplier_id == Some(supplier_id))
            .collect();

        let outstanding = checked_sum(
            invoices
                .iter()
                .map(|inv| inv.total_amount.checked_sub(inv.paid_amount)),
        )?;
        let paid = checked_sum(invoices.iter().map(|inv| Some(inv.paid_amount)))?;

        Ok(SupplierBalance::new(
            supplier_id,
            outstanding,
            paid,
            invoices.len() as i64,
        ))
    }
}

#[async_trait]
impl AuditRepository for MemoryUnitOfWork {
    async fn insert_audit_entry(
        &mut self,
        user_id: Option<UserId>,
        action: &str,
    ) -> Result<i64> {
        let id = next_id(&mut self.working.last_audit_id);
        self.working.audit.push(AuditEntry {
            id,
            user_id,
            action: action.to_string(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list_audit_entries(&mut self, limit: i64) -> Result<Vec<AuditEntry>> {
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        Ok(self.working.audit.iter().rev().take(limit).cloned().collect())
    }

    async fn list_user_audit_entries(
        &mut self,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<AuditEntry>> {
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        Ok(self
            .working
            .audit
            .iter()
            .rev()
            .filter(|entry| entry.user_id == Some(user_id))
            .take(limit)
            .cloned()
            .collect())
    }
}

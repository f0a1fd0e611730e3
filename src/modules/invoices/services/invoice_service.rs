use std::sync::Arc;
use tracing::{info, warn};

use crate::core::money;
use crate::core::traits::{Store, UnitOfWork};
use crate::core::{AppError, InvoiceId, OrderId, Permission, Result, User, UserId};
use crate::modules::audit::{actions, record_action};
use crate::modules::invoices::models::{Invoice, InvoiceDraft, InvoiceWithBalance, NewInvoice};
use crate::modules::purchase_orders::models::OrderStatus;
use crate::modules::invoices::repositories::InvoiceRepository;
use crate::modules::payments::repositories::PaymentRepository;
use crate::modules::purchase_orders::repositories::LineItemRepository;
use crate::modules::purchase_orders::repositories::PurchaseOrderRepository;

/// Service for invoice business logic
pub struct InvoiceService<S: Store> {
    store: Arc<S>,
}

impl<S: Store> Clone for InvoiceService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: Store> InvoiceService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Raise an invoice for an order
    ///
    /// The total is the live Σ quantity × unit_price of the order's items at
    /// this moment; later item changes do not touch it.
    ///
    /// # Errors
    /// * `Validation` - blank or overlong number, due date before invoice date
    /// * `NotFound` - order does not exist
    /// * `InvalidState` - order is cancelled or already invoiced
    /// * `Storage` - invoice number already used
    pub async fn create_from_order(
        &self,
        order_id: OrderId,
        details: NewInvoice,
    ) -> Result<Invoice> {
        self.raise(order_id, details, None).await
    }

    /// `create_from_order` on behalf of `user`, who needs `ManageInvoices`
    pub async fn create_from_order_as(
        &self,
        user: &User,
        order_id: OrderId,
        details: NewInvoice,
    ) -> Result<Invoice> {
        user.authorize(Permission::ManageInvoices)?;
        self.raise(order_id, details, Some(user.id)).await
    }

    async fn raise(
        &self,
        order_id: OrderId,
        details: NewInvoice,
        acting_user: Option<UserId>,
    ) -> Result<Invoice> {
        details.validate()?;

        let mut uow = self.store.begin().await?;
        let order = uow
            .lock_order(order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Purchase order {} not found", order_id)))?;

        if order.status == OrderStatus::Cancelled {
            return Err(AppError::invalid_state(format!(
                "Order {} is CANCELLED and cannot be invoiced",
                order_id
            )));
        }

        if let Some(existing) = uow.find_invoice_by_order(order_id).await? {
            return Err(AppError::invalid_state(format!(
                "Order {} already has invoice {}",
                order_id, existing.invoice_number
            )));
        }

        let total = money::bounded(uow.sum_item_value(order_id).await?)?;
        let draft = InvoiceDraft::new(order_id, order.supplier_id, details, total);
        let invoice_id = uow.insert_invoice(&draft).await?;
        let invoice = uow.find_invoice(invoice_id).await?.ok_or_else(|| {
            AppError::storage(format!("Invoice {} missing after insert", invoice_id))
        })?;
        let action = actions::invoice_created(invoice_id, order_id, &invoice.invoice_number);
        record_action(&mut uow, acting_user, action).await?;
        uow.commit().await?;

        info!(
            invoice_id = invoice.id,
            order_id = order_id,
            invoice_number = invoice.invoice_number.as_str(),
            total_amount = %invoice.total_amount,
            "Invoice created"
        );

        Ok(invoice)
    }

    /// Invoice plus `remaining = total − Σ payments`
    ///
    /// The payments ledger is authoritative. If the cached paid amount has
    /// drifted from it, the returned invoice carries the ledger figure.
    pub async fn get_with_balance(&self, invoice_id: InvoiceId) -> Result<InvoiceWithBalance> {
        let mut uow = self.store.begin().await?;
        let mut invoice = uow
            .find_invoice(invoice_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Invoice {} not found", invoice_id)))?;

        let paid = uow.sum_payments(invoice_id).await?;
        if paid != invoice.paid_amount {
            warn!(
                invoice_id = invoice_id,
                cached = %invoice.paid_amount,
                ledger = %paid,
                "Cached paid amount differs from payments ledger"
            );
            invoice.settle_to(paid);
        }

        let remaining = money::quantize(invoice.total_amount.saturating_sub(paid));

        Ok(InvoiceWithBalance { invoice, remaining })
    }

    pub async fn get(&self, invoice_id: InvoiceId) -> Result<Invoice> {
        let mut uow = self.store.begin().await?;
        uow.find_invoice(invoice_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Invoice {} not found", invoice_id)))
    }

    /// The invoice raised for an order, if any
    pub async fn find_by_order(&self, order_id: OrderId) -> Result<Option<Invoice>> {
        let mut uow = self.store.begin().await?;
        uow.find_invoice_by_order(order_id).await
    }
}

// Payments against supplier invoices.
//
// The payments table is the ledger; `invoices.paid_amount` is a cache of its
// sum. Recording a payment appends to the ledger and refreshes the cache and
// the derived status in one unit of work.

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::core::money;
use crate::core::traits::{Store, UnitOfWork};
use crate::core::{AppError, InvoiceId, Permission, Result, ToMoney, User, UserId};
use crate::modules::audit::{actions, record_action};
use crate::modules::invoices::models::{Invoice, InvoiceStatus};
use crate::modules::payments::models::{NewPayment, Payment, PaymentMethod};
use crate::modules::invoices::repositories::InvoiceRepository;
use crate::modules::payments::repositories::PaymentRepository;

/// Service for recording and listing payments
pub struct PaymentService<S: Store> {
    store: Arc<S>,
    default_method: PaymentMethod,
}

impl<S: Store> Clone for PaymentService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            default_method: self.default_method,
        }
    }
}

impl<S: Store> PaymentService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            default_method: PaymentMethod::default(),
        }
    }

    /// Service using the configured `DEFAULT_PAYMENT_METHOD`
    pub fn from_config(store: Arc<S>, config: &AppConfig) -> Self {
        Self::new(store).with_default_method(config.default_payment_method)
    }

    /// Method used when `record` is called without one
    pub fn with_default_method(mut self, method: PaymentMethod) -> Self {
        self.default_method = method;
        self
    }

    /// Record a payment and refresh the invoice's paid amount and status
    ///
    /// Overpayment is accepted: the invoice becomes PAID and the surplus shows
    /// as a negative remaining balance.
    ///
    /// # Errors
    /// * `Validation` - non-numeric or non-positive amount, or a paid total
    ///   beyond the amount column
    /// * `NotFound` - invoice does not exist
    pub async fn record(
        &self,
        invoice_id: InvoiceId,
        amount: impl ToMoney,
        method: Option<PaymentMethod>,
    ) -> Result<Payment> {
        self.append(invoice_id, amount, method, None).await
    }

    /// `record` on behalf of `user`, who needs `RecordPayments`
    ///
    /// The payment and its audit entry are written in one unit of work.
    pub async fn record_as(
        &self,
        user: &User,
        invoice_id: InvoiceId,
        amount: impl ToMoney,
        method: Option<PaymentMethod>,
    ) -> Result<Payment> {
        user.authorize(Permission::RecordPayments)?;
        self.append(invoice_id, amount, method, Some(user.id)).await
    }

    async fn append(
        &self,
        invoice_id: InvoiceId,
        amount: impl ToMoney,
        method: Option<PaymentMethod>,
        acting_user: Option<UserId>,
    ) -> Result<Payment> {
        let payment = NewPayment::new(
            invoice_id,
            amount,
            method.unwrap_or(self.default_method),
        )?;

        let mut uow = self.store.begin().await?;
        let invoice = uow
            .lock_invoice(invoice_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Invoice {} not found", invoice_id)))?;

        let paid_so_far = uow.sum_payments(invoice_id).await?;
        let new_paid = money::checked_add(paid_so_far, payment.amount)?;
        let status = InvoiceStatus::from_amounts(new_paid, invoice.total_amount);

        if new_paid > invoice.total_amount {
            warn!(
                invoice_id = invoice_id,
                total_amount = %invoice.total_amount,
                paid_amount = %new_paid,
                "Invoice overpaid"
            );
        }

        let payment_id = uow.insert_payment(&payment).await?;
        uow.update_invoice_payment(invoice_id, new_paid, status)
            .await?;
        let action =
            actions::payment_recorded(payment_id, invoice_id, payment.amount, payment.method);
        record_action(&mut uow, acting_user, action).await?;
        uow.commit().await?;

        info!(
            payment_id = payment_id,
            invoice_id = invoice_id,
            amount = %payment.amount,
            method = %payment.method,
            status = %status,
            "Payment recorded"
        );

        Ok(payment.into_payment(payment_id))
    }

    /// Payments of an invoice, newest first
    pub async fn list_for_invoice(&self, invoice_id: InvoiceId) -> Result<Vec<Payment>> {
        let mut uow = self.store.begin().await?;
        if uow.find_invoice(invoice_id).await?.is_none() {
            return Err(AppError::not_found(format!("Invoice {} not found", invoice_id)));
        }

        uow.list_payments(invoice_id).await
    }

    /// Rewrite the cached paid amount and status from the payments ledger
    pub async fn reconcile(&self, invoice_id: InvoiceId) -> Result<Invoice> {
        let mut uow = self.store.begin().await?;
        let mut invoice = uow
            .lock_invoice(invoice_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Invoice {} not found", invoice_id)))?;

        let ledger: Decimal = uow.sum_payments(invoice_id).await?;
        let expected = InvoiceStatus::from_amounts(ledger, invoice.total_amount);
        if ledger == invoice.paid_amount && expected == invoice.status {
            return Ok(invoice);
        }

        warn!(
            invoice_id = invoice_id,
            cached = %invoice.paid_amount,
            ledger = %ledger,
            "Reconciling invoice with payments ledger"
        );

        invoice.settle_to(ledger);
        uow.update_invoice_payment(invoice_id, invoice.paid_amount, invoice.status)
            .await?;
        uow.commit().await?;

        Ok(invoice)
    }
}

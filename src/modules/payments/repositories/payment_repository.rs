use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::core::money;
use crate::core::{InvoiceId, PaymentId, Result};
use crate::modules::payments::models::{NewPayment, Payment, PaymentMethod};
use crate::store::mysql::{db_error, inserted_id, MySqlUnitOfWork};

/// Storage operations on the append-only payments ledger
#[async_trait]
pub trait PaymentRepository: Send {
    /// Append a payment; the invoice must exist
    ///
    /// # Returns
    /// * the store-assigned payment id
    async fn insert_payment(&mut self, payment: &NewPayment) -> Result<PaymentId>;

    /// Payments of an invoice, newest first (id breaks ties)
    async fn list_payments(&mut self, invoice_id: InvoiceId) -> Result<Vec<Payment>>;

    /// Σ amount over the invoice's payments, `0.00` when none
    async fn sum_payments(&mut self, invoice_id: InvoiceId) -> Result<Decimal>;
}

#[async_trait]
impl PaymentRepository for MySqlUnitOfWork {
    async fn insert_payment(&mut self, payment: &NewPayment) -> Result<PaymentId> {
        let result = sqlx::query(
            r#"
            INSERT INTO payments (invoice_id, payment_date, amount, method)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(payment.invoice_id)
        .bind(payment.payment_date)
        .bind(payment.amount)
        .bind(payment.method.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("Failed to record payment"))?;

        Ok(inserted_id(&result))
    }

    async fn list_payments(&mut self, invoice_id: InvoiceId) -> Result<Vec<Payment>> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, invoice_id, payment_date, amount, method
            FROM payments
            WHERE invoice_id = ?
            ORDER BY payment_date DESC, id DESC
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error("Failed to list payments"))?;

        rows.into_iter().map(PaymentRow::into_payment).collect()
    }

    async fn sum_payments(&mut self, invoice_id: InvoiceId) -> Result<Decimal> {
        let total: Decimal = sqlx::query_scalar(
            r#"
            SELECT CAST(COALESCE(SUM(amount), 0) AS DECIMAL(14,2))
            FROM payments
            WHERE invoice_id = ?
            "#,
        )
        .bind(invoice_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_error("Failed to sum payments"))?;

        Ok(money::quantize(total))
    }
}

// Helper struct for database mapping

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: i64,
    invoice_id: i64,
    payment_date: DateTime<Utc>,
    amount: Decimal,
    method: String,
}

impl PaymentRow {
    fn into_payment(self) -> Result<Payment> {
        Ok(Payment {
            id: self.id,
            invoice_id: self.invoice_id,
            payment_date: self.payment_date,
            amount: money::quantize(self.amount),
            method: PaymentMethod::from_str(&self.method)?,
        })
    }
}

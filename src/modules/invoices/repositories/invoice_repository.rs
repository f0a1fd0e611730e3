// Invoice persistence.
//
// `invoice_number` and `order_id` are both unique in storage; a second invoice
// for the same number or order surfaces as a `Storage` error.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::core::money;
use crate::core::{InvoiceId, OrderId, Result};
use crate::modules::invoices::models::{Invoice, InvoiceDraft, InvoiceStatus};
use crate::store::mysql::{db_error, inserted_id, MySqlUnitOfWork};

/// Storage operations on invoices
#[async_trait]
pub trait InvoiceRepository: Send {
    /// Insert an UNPAID invoice with nothing paid
    ///
    /// # Returns
    /// * the store-assigned invoice id
    async fn insert_invoice(&mut self, draft: &InvoiceDraft) -> Result<InvoiceId>;

    async fn find_invoice(&mut self, id: InvoiceId) -> Result<Option<Invoice>>;

    /// Read the invoice and hold it until the unit of work ends
    async fn lock_invoice(&mut self, id: InvoiceId) -> Result<Option<Invoice>>;

    async fn find_invoice_by_order(&mut self, order_id: OrderId) -> Result<Option<Invoice>>;

    /// Write the cached paid amount and its derived status
    async fn update_invoice_payment(
        &mut self,
        id: InvoiceId,
        paid_amount: Decimal,
        status: InvoiceStatus,
    ) -> Result<u64>;
}

const INVOICE_COLUMNS: &str = "id, order_id, supplier_id, invoice_number, invoice_date, \
     due_date, total_amount, paid_amount, status, created_at";

#[async_trait]
impl InvoiceRepository for MySqlUnitOfWork {
    async fn insert_invoice(&mut self, draft: &InvoiceDraft) -> Result<InvoiceId> {
        let result = sqlx::query(
            r#"
            INSERT INTO invoices (
                order_id, supplier_id, invoice_number, invoice_date, due_date,
                total_amount, paid_amount, status, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, 0.00, ?, ?)
            "#,
        )
        .bind(draft.order_id)
        .bind(draft.supplier_id)
        .bind(&draft.invoice_number)
        .bind(draft.invoice_date)
        .bind(draft.due_date)
        .bind(draft.total_amount)
        .bind(InvoiceStatus::Unpaid.as_str())
        .bind(draft.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("Failed to create invoice"))?;

        Ok(inserted_id(&result))
    }

    async fn find_invoice(&mut self, id: InvoiceId) -> Result<Option<Invoice>> {
        let sql = format!("SELECT {} FROM invoices WHERE id = ?", INVOICE_COLUMNS);
        let row = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db_error("Failed to fetch invoice"))?;

        row.map(InvoiceRow::into_invoice).transpose()
    }

    async fn lock_invoice(&mut self, id: InvoiceId) -> Result<Option<Invoice>> {
        let sql = format!("SELECT {} FROM invoices WHERE id = ? FOR UPDATE", INVOICE_COLUMNS);
        let row = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db_error("Failed to lock invoice"))?;

        row.map(InvoiceRow::into_invoice).transpose()
    }

    async fn find_invoice_by_order(&mut self, order_id: OrderId) -> Result<Option<Invoice>> {
        let sql = format!("SELECT {} FROM invoices WHERE order_id = ?", INVOICE_COLUMNS);
        let row = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(order_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db_error("Failed to fetch invoice by order"))?;

        row.map(InvoiceRow::into_invoice).transpose()
    }

    async fn update_invoice_payment(
        &mut self,
        id: InvoiceId,
        paid_amount: Decimal,
        status: InvoiceStatus,
    ) -> Result<u64> {
        let result = sqlx::query("UPDATE invoices SET paid_amount = ?, status = ? WHERE id = ?")
            .bind(paid_amount)
            .bind(status.as_str())
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("Failed to update invoice payment"))?;

        Ok(result.rows_affected())
    }
}

// Helper struct for database mapping

#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: i64,
    order_id: Option<i64>,
    supplier_id: Option<i64>,
    invoice_number: String,
    invoice_date: NaiveDate,
    due_date: Option<NaiveDate>,
    total_amount: Decimal,
    paid_amount: Decimal,
    status: String,
    created_at: DateTime<Utc>,
}

impl InvoiceRow {
    fn into_invoice(self) -> Result<Invoice> {
        let status = InvoiceStatus::from_str(&self.status)?;

        Ok(Invoice {
            id: self.id,
            order_id: self.order_id,
            supplier_id: self.supplier_id,
            invoice_number: self.invoice_number,
            invoice_date: self.invoice_date,
            due_date: self.due_date,
            total_amount: money::quantize(self.total_amount),
            paid_amount: money::quantize(self.paid_amount),
            status,
            created_at: self.created_at,
        })
    }
}

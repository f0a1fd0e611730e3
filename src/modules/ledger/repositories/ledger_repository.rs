use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::core::{Result, SupplierId};
use crate::modules::ledger::models::SupplierBalance;
use crate::store::mysql::{db_error, MySqlUnitOfWork};

/// Aggregate reads over a supplier's invoices
#[async_trait]
pub trait LedgerRepository: Send {
    /// Outstanding and paid totals; zeros for a supplier with no invoices
    async fn supplier_totals(&mut self, supplier_id: SupplierId) -> Result<SupplierBalance>;
}

#[async_trait]
impl LedgerRepository for MySqlUnitOfWork {
    async fn supplier_totals(&mut self, supplier_id: SupplierId) -> Result<SupplierBalance> {
        let row = sqlx::query_as::<_, SupplierTotalsRow>(
            r#"
            SELECT
                CAST(COALESCE(SUM(total_amount - paid_amount), 0) AS DECIMAL(14,2)) AS outstanding,
                CAST(COALESCE(SUM(paid_amount), 0) AS DECIMAL(14,2)) AS paid,
                COUNT(*) AS invoice_count
            FROM invoices
            WHERE supplier_id = ?
            "#,
        )
        .bind(supplier_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_error("Failed to aggregate supplier invoices"))?;

        Ok(SupplierBalance::new(
            supplier_id,
            row.outstanding,
            row.paid,
            row.invoice_count,
        ))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SupplierTotalsRow {
    outstanding: Decimal,
    paid: Decimal,
    invoice_count: i64,
}

// Supplier persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::str::FromStr;

use crate::core::{Result, SupplierId};
use crate::modules::suppliers::models::{NewSupplier, Supplier, SupplierStatus};
use crate::store::mysql::{db_error, inserted_id, MySqlUnitOfWork};

/// Storage operations on the supplier directory
#[async_trait]
pub trait SupplierRepository: Send {
    /// Insert an ACTIVE supplier
    ///
    /// # Returns
    /// * the store-assigned supplier id
    async fn insert_supplier(
        &mut self,
        supplier: &NewSupplier,
        created_at: DateTime<Utc>,
    ) -> Result<SupplierId>;

    async fn find_supplier(&mut self, id: SupplierId) -> Result<Option<Supplier>>;

    /// ACTIVE suppliers ordered by name
    async fn list_active_suppliers(&mut self) -> Result<Vec<Supplier>>;

    async fn set_supplier_status(&mut self, id: SupplierId, status: SupplierStatus)
        -> Result<u64>;
}

const SUPPLIER_COLUMNS: &str =
    "id, supplier_name, contact_name, phone, email, address, status, created_at";

#[async_trait]
impl SupplierRepository for MySqlUnitOfWork {
    async fn insert_supplier(
        &mut self,
        supplier: &NewSupplier,
        created_at: DateTime<Utc>,
    ) -> Result<SupplierId> {
        let result = sqlx::query(
            r#"
            INSERT INTO suppliers (
                supplier_name, contact_name, phone, email, address, status, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&supplier.name)
        .bind(&supplier.contact_name)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.address)
        .bind(SupplierStatus::Active.as_str())
        .bind(created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("Failed to create supplier"))?;

        Ok(inserted_id(&result))
    }

    async fn find_supplier(&mut self, id: SupplierId) -> Result<Option<Supplier>> {
        let sql = format!("SELECT {} FROM suppliers WHERE id = ?", SUPPLIER_COLUMNS);
        let row = sqlx::query_as::<_, SupplierRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db_error("Failed to fetch supplier"))?;

        row.map(SupplierRow::into_supplier).transpose()
    }

    async fn list_active_suppliers(&mut self) -> Result<Vec<Supplier>> {
        let sql = format!(
            "SELECT {} FROM suppliers WHERE status = ? ORDER BY supplier_name, id",
            SUPPLIER_COLUMNS
        );
        let rows = sqlx::query_as::<_, SupplierRow>(&sql)
            .bind(SupplierStatus::Active.as_str())
            .fetch_all(&mut *self.tx)
            .await
            .map_err(db_error("Failed to list suppliers"))?;

        rows.into_iter().map(SupplierRow::into_supplier).collect()
    }

    async fn set_supplier_status(
        &mut self,
        id: SupplierId,
        status: SupplierStatus,
    ) -> Result<u64> {
        let result = sqlx::query("UPDATE suppliers SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("Failed to update supplier status"))?;

        Ok(result.rows_affected())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SupplierRow {
    id: i64,
    supplier_name: String,
    contact_name: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl SupplierRow {
    fn into_supplier(self) -> Result<Supplier> {
        Ok(Supplier {
            id: self.id,
            name: self.supplier_name,
            contact_name: self.contact_name,
            phone: self.phone,
            email: self.email,
            address: self.address,
            status: SupplierStatus::from_str(&self.status)?,
            created_at: self.created_at,
        })
    }
}

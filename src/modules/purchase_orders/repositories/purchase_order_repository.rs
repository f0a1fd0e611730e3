// Purchase order header persistence.
//
// `lock_order` is the entry point for every read-check-write on an order: it
// takes a row lock so status checks and item writes see a stable header.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::core::{OrderId, Result, SupplierId};
use crate::modules::purchase_orders::models::{NewPurchaseOrder, OrderStatus, PurchaseOrder};
use crate::store::mysql::{db_error, inserted_id, MySqlUnitOfWork};

/// Storage operations on purchase order headers
#[async_trait]
pub trait PurchaseOrderRepository: Send {
    /// Insert a PENDING header with a zero total
    ///
    /// # Returns
    /// * the store-assigned order id
    async fn insert_order(
        &mut self,
        order: &NewPurchaseOrder,
        order_date: DateTime<Utc>,
    ) -> Result<OrderId>;

    async fn find_order(&mut self, id: OrderId) -> Result<Option<PurchaseOrder>>;

    /// Read the header and hold it until the unit of work ends
    async fn lock_order(&mut self, id: OrderId) -> Result<Option<PurchaseOrder>>;

    /// Orders of one supplier, newest first
    async fn list_orders_by_supplier(&mut self, supplier_id: SupplierId)
        -> Result<Vec<PurchaseOrder>>;

    async fn update_order_status(&mut self, id: OrderId, status: OrderStatus) -> Result<u64>;

    /// Persist supplier and expected delivery date from `order`
    async fn update_order_details(&mut self, order: &PurchaseOrder) -> Result<u64>;

    async fn set_order_total(&mut self, id: OrderId, total: Decimal) -> Result<u64>;

    /// Delete the header; its items go with it
    async fn delete_order(&mut self, id: OrderId) -> Result<u64>;
}

const ORDER_COLUMNS: &str = "id, supplier_id, created_by_id, order_date, \
     expected_delivery_date, status, total_amount";

#[async_trait]
impl PurchaseOrderRepository for MySqlUnitOfWork {
    async fn insert_order(
        &mut self,
        order: &NewPurchaseOrder,
        order_date: DateTime<Utc>,
    ) -> Result<OrderId> {
        let result = sqlx::query(
            r#"
            INSERT INTO purchase_orders (
                supplier_id, created_by_id, order_date, expected_delivery_date, status, total_amount
            ) VALUES (?, ?, ?, ?, ?, 0.00)
            "#,
        )
        .bind(order.supplier_id)
        .bind(order.created_by_id)
        .bind(order_date)
        .bind(order.expected_delivery_date)
        .bind(OrderStatus::Pending.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("Failed to create purchase order"))?;

        Ok(inserted_id(&result))
    }

    async fn find_order(&mut self, id: OrderId) -> Result<Option<PurchaseOrder>> {
        let sql = format!("SELECT {} FROM purchase_orders WHERE id = ?", ORDER_COLUMNS);
        let row = sqlx::query_as::<_, PurchaseOrderRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db_error("Failed to fetch purchase order"))?;

        row.map(PurchaseOrderRow::into_order).transpose()
    }

    async fn lock_order(&mut self, id: OrderId) -> Result<Option<PurchaseOrder>> {
        let sql = format!(
            "SELECT {} FROM purchase_orders WHERE id = ? FOR UPDATE",
            ORDER_COLUMNS
        );
        let row = sqlx::query_as::<_, PurchaseOrderRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db_error("Failed to lock purchase order"))?;

        row.map(PurchaseOrderRow::into_order).transpose()
    }

    async fn list_orders_by_supplier(
        &mut self,
        supplier_id: SupplierId,
    ) -> Result<Vec<PurchaseOrder>> {
        let sql = format!(
            "SELECT {} FROM purchase_orders WHERE supplier_id = ? \
             ORDER BY order_date DESC, id DESC",
            ORDER_COLUMNS
        );
        let rows = sqlx::query_as::<_, PurchaseOrderRow>(&sql)
            .bind(supplier_id)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(db_error("Failed to list purchase orders"))?;

        rows.into_iter().map(PurchaseOrderRow::into_order).collect()
    }

    async fn update_order_status(&mut self, id: OrderId, status: OrderStatus) -> Result<u64> {
        let result = sqlx::query("UPDATE purchase_orders SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("Failed to update order status"))?;

        Ok(result.rows_affected())
    }

    async fn update_order_details(&mut self, order: &PurchaseOrder) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE purchase_orders SET supplier_id = ?, expected_delivery_date = ? WHERE id = ?",
        )
        .bind(order.supplier_id)
        .bind(order.expected_delivery_date)
        .bind(order.id)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("Failed to update purchase order"))?;

        Ok(result.rows_affected())
    }

    async fn set_order_total(&mut self, id: OrderId, total: Decimal) -> Result<u64> {
        let result = sqlx::query("UPDATE purchase_orders SET total_amount = ? WHERE id = ?")
            .bind(total)
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("Failed to update order total"))?;

        Ok(result.rows_affected())
    }

    async fn delete_order(&mut self, id: OrderId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM purchase_orders WHERE id = ?")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("Failed to delete purchase order"))?;

        Ok(result.rows_affected())
    }
}

// Helper struct for database mapping

#[derive(Debug, sqlx::FromRow)]
struct PurchaseOrderRow {
    id: i64,
    supplier_id: i64,
    created_by_id: i64,
    order_date: DateTime<Utc>,
    expected_delivery_date: Option<NaiveDate>,
    status: String,
    total_amount: Decimal,
}

impl PurchaseOrderRow {
    fn into_order(self) -> Result<PurchaseOrder> {
        let status = OrderStatus::from_str(&self.status)?;

        Ok(PurchaseOrder {
            id: self.id,
            supplier_id: self.supplier_id,
            created_by_id: self.created_by_id,
            order_date: self.order_date,
            expected_delivery_date: self.expected_delivery_date,
            status,
            total_amount: crate::core::money::quantize(self.total_amount),
        })
    }
}

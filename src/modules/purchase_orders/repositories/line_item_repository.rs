use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::core::money;
use crate::core::{ItemId, OrderId, Result};
use crate::modules::purchase_orders::models::OrderLineItem;
use crate::store::mysql::{db_error, inserted_id, MySqlUnitOfWork};

/// Storage operations on purchase order line items
#[async_trait]
pub trait LineItemRepository: Send {
    /// Insert an item; the parent order must exist
    ///
    /// # Returns
    /// * the store-assigned item id
    async fn insert_item(&mut self, item: &OrderLineItem) -> Result<ItemId>;

    /// Item `item_id`, only if it belongs to `order_id`
    async fn find_item(&mut self, order_id: OrderId, item_id: ItemId)
        -> Result<Option<OrderLineItem>>;

    /// Persist discount, tax rate and `updated_at` of a stored item
    async fn update_item_pricing(&mut self, item: &OrderLineItem) -> Result<u64>;

    async fn delete_item(&mut self, order_id: OrderId, item_id: ItemId) -> Result<u64>;

    /// Items of an order in insertion order
    async fn list_items(&mut self, order_id: OrderId) -> Result<Vec<OrderLineItem>>;

    /// Σ quantity × unit_price over the stored items, `0.00` when none
    async fn sum_item_value(&mut self, order_id: OrderId) -> Result<Decimal>;
}

const ITEM_COLUMNS: &str =
    "id, order_id, product_id, quantity, unit_price, discount, tax_rate, created_at, updated_at";

#[async_trait]
impl LineItemRepository for MySqlUnitOfWork {
    async fn insert_item(&mut self, item: &OrderLineItem) -> Result<ItemId> {
        let result = sqlx::query(
            r#"
            INSERT INTO purchase_order_items (
                order_id, product_id, quantity, unit_price, discount, tax_rate,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(item.order_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.discount)
        .bind(item.tax_rate)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("Failed to create line item"))?;

        Ok(inserted_id(&result))
    }

    async fn find_item(
        &mut self,
        order_id: OrderId,
        item_id: ItemId,
    ) -> Result<Option<OrderLineItem>> {
        let sql = format!(
            "SELECT {} FROM purchase_order_items WHERE id = ? AND order_id = ?",
            ITEM_COLUMNS
        );
        let row = sqlx::query_as::<_, LineItemRow>(&sql)
            .bind(item_id)
            .bind(order_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db_error("Failed to fetch line item"))?;

        Ok(row.map(LineItemRow::into_line_item))
    }

    async fn update_item_pricing(&mut self, item: &OrderLineItem) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE purchase_order_items
            SET discount = ?, tax_rate = ?, updated_at = ?
            WHERE id = ? AND order_id = ?
            "#,
        )
        .bind(item.discount)
        .bind(item.tax_rate)
        .bind(item.updated_at)
        .bind(item.id)
        .bind(item.order_id)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("Failed to update line item"))?;

        Ok(result.rows_affected())
    }

    async fn delete_item(&mut self, order_id: OrderId, item_id: ItemId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM purchase_order_items WHERE id = ? AND order_id = ?")
            .bind(item_id)
            .bind(order_id)
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("Failed to delete line item"))?;

        Ok(result.rows_affected())
    }

    async fn list_items(&mut self, order_id: OrderId) -> Result<Vec<OrderLineItem>> {
        let sql = format!(
            "SELECT {} FROM purchase_order_items WHERE order_id = ? ORDER BY id",
            ITEM_COLUMNS
        );
        let rows = sqlx::query_as::<_, LineItemRow>(&sql)
            .bind(order_id)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(db_error("Failed to fetch line items"))?;

        Ok(rows.into_iter().map(LineItemRow::into_line_item).collect())
    }

    async fn sum_item_value(&mut self, order_id: OrderId) -> Result<Decimal> {
        let total: Decimal = sqlx::query_scalar(
            r#"
            SELECT CAST(COALESCE(SUM(quantity * unit_price), 0) AS DECIMAL(14,2))
            FROM purchase_order_items
            WHERE order_id = ?
            "#,
        )
        .bind(order_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_error("Failed to sum line items"))?;

        Ok(money::quantize(total))
    }
}

// Helper struct for database mapping

#[derive(Debug, sqlx::FromRow)]
struct LineItemRow {
    id: i64,
    order_id: i64,
    product_id: i64,
    quantity: i32,
    unit_price: Decimal,
    discount: Decimal,
    tax_rate: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LineItemRow {
    fn into_line_item(self) -> OrderLineItem {
        OrderLineItem {
            id: Some(self.id),
            order_id: self.order_id,
            product_id: self.product_id,
            quantity: self.quantity,
            unit_price: money::quantize(self.unit_price),
            discount: money::quantize(self.discount),
            tax_rate: self.tax_rate.normalize(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

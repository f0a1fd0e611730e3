// Purchase order lifecycle and item accounting.
//
// Every mutating operation locks the order header first, checks the stored
// status, writes, then recomputes `total_amount` from the stored items before
// committing. Any error drops the unit of work and with it every partial write.

use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::money;
use crate::core::traits::{Store, UnitOfWork};
use crate::core::{
    AppError, ItemId, OrderId, Permission, ProductId, Result, SupplierId, ToMoney, User, UserId,
};
use crate::modules::audit::{actions, record_action};
use crate::modules::purchase_orders::models::{
    LineItemPricingUpdate, NewPurchaseOrder, OrderLineItem, OrderStatus, PurchaseOrder,
    PurchaseOrderUpdate,
};
use crate::modules::invoices::repositories::InvoiceRepository;
use crate::modules::purchase_orders::repositories::LineItemRepository;
use crate::modules::purchase_orders::repositories::PurchaseOrderRepository;

/// Service for purchase order business logic
pub struct PurchaseOrderService<S: Store> {
    store: Arc<S>,
}

impl<S: Store> Clone for PurchaseOrderService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

/// Sum the stored items and write the result onto the header
async fn refresh_total<U: UnitOfWork>(uow: &mut U, order_id: OrderId) -> Result<Decimal> {
    let total = money::bounded(uow.sum_item_value(order_id).await?).map_err(|_| {
        AppError::validation(format!(
            "Order {} total would exceed {}",
            order_id,
            money::max_amount()
        ))
    })?;
    uow.set_order_total(order_id, total).await?;

    debug!(order_id = order_id, total = %total, "Order total recomputed");

    Ok(total)
}

async fn locked_order<U: UnitOfWork>(uow: &mut U, order_id: OrderId) -> Result<PurchaseOrder> {
    uow.lock_order(order_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Purchase order {} not found", order_id)))
}

/// Orders may only be raised against a registered ACTIVE supplier
async fn active_supplier<U: UnitOfWork>(uow: &mut U, supplier_id: SupplierId) -> Result<()> {
    uow.find_supplier(supplier_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Supplier {} not found", supplier_id)))?
        .ensure_active()
}

impl<S: Store> PurchaseOrderService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Create a PENDING order with a zero total
    ///
    /// # Errors
    /// * `Validation` - non-positive supplier or creator id
    /// * `NotFound` - supplier is not registered
    /// * `InvalidState` - supplier is inactive
    pub async fn create(&self, new_order: NewPurchaseOrder) -> Result<PurchaseOrder> {
        self.insert_order(new_order, None).await
    }

    /// `create` on behalf of `user`, who is recorded as the creator
    pub async fn create_as(
        &self,
        user: &User,
        mut new_order: NewPurchaseOrder,
    ) -> Result<PurchaseOrder> {
        user.authorize(Permission::ManageOrders)?;
        new_order.created_by_id = user.id;

        self.insert_order(new_order, Some(user.id)).await
    }

    async fn insert_order(
        &self,
        new_order: NewPurchaseOrder,
        acting_user: Option<UserId>,
    ) -> Result<PurchaseOrder> {
        new_order.validate()?;

        let mut uow = self.store.begin().await?;
        active_supplier(&mut uow, new_order.supplier_id).await?;

        let id = uow.insert_order(&new_order, Utc::now()).await?;
        let order = uow.find_order(id).await?.ok_or_else(|| {
            AppError::storage(format!("Purchase order {} missing after insert", id))
        })?;
        record_action(&mut uow, acting_user, actions::order_created(id, order.supplier_id))
            .await?;
        uow.commit().await?;

        info!(
            order_id = order.id,
            supplier_id = order.supplier_id,
            created_by_id = order.created_by_id,
            "Purchase order created"
        );

        Ok(order)
    }

    /// Add a plain line (no discount, no tax) and recompute the order total
    pub async fn add_item(
        &self,
        order_id: OrderId,
        product_id: ProductId,
        quantity: i32,
        unit_price: impl ToMoney,
    ) -> Result<OrderLineItem> {
        let item = OrderLineItem::new(order_id, product_id, quantity, unit_price)?;
        self.add_line_item(order_id, item).await
    }

    /// `add_item` on behalf of `user`; needs `ManageOrders` and is audited
    pub async fn add_item_as(
        &self,
        user: &User,
        order_id: OrderId,
        product_id: ProductId,
        quantity: i32,
        unit_price: impl ToMoney,
    ) -> Result<OrderLineItem> {
        user.authorize(Permission::ManageOrders)?;
        let item = OrderLineItem::new(order_id, product_id, quantity, unit_price)?;
        self.insert_line(order_id, item, Some(user.id)).await
    }

    /// Add a fully specified line and recompute the order total
    ///
    /// # Errors
    /// * `NotFound` - order does not exist
    /// * `InvalidState` - order is past APPROVED or cancelled
    /// * `Validation` - the new total would not fit the amount column
    pub async fn add_line_item(
        &self,
        order_id: OrderId,
        item: OrderLineItem,
    ) -> Result<OrderLineItem> {
        self.insert_line(order_id, item, None).await
    }

    async fn insert_line(
        &self,
        order_id: OrderId,
        mut item: OrderLineItem,
        acting_user: Option<UserId>,
    ) -> Result<OrderLineItem> {
        item.id = None;
        item.order_id = order_id;

        let mut uow = self.store.begin().await?;
        let order = locked_order(&mut uow, order_id).await?;
        order.ensure_items_editable()?;

        let item_id = uow.insert_item(&item).await?;
        let total = refresh_total(&mut uow, order_id).await?;
        let stored = uow.find_item(order_id, item_id).await?.ok_or_else(|| {
            AppError::storage(format!("Line item {} missing after insert", item_id))
        })?;
        let action = actions::item_added(order_id, item_id, stored.product_id, stored.quantity);
        record_action(&mut uow, acting_user, action).await?;
        uow.commit().await?;

        info!(
            order_id = order_id,
            item_id = item_id,
            product_id = stored.product_id,
            quantity = stored.quantity,
            total = %total,
            "Line item added"
        );

        Ok(stored)
    }

    /// Remove a line and recompute the order total
    ///
    /// # Returns
    /// * the order with its refreshed total
    pub async fn remove_item(&self, order_id: OrderId, item_id: ItemId) -> Result<PurchaseOrder> {
        self.delete_line(order_id, item_id, None).await
    }

    /// `remove_item` on behalf of `user`; needs `ManageOrders` and is audited
    pub async fn remove_item_as(
        &self,
        user: &User,
        order_id: OrderId,
        item_id: ItemId,
    ) -> Result<PurchaseOrder> {
        user.authorize(Permission::ManageOrders)?;
        self.delete_line(order_id, item_id, Some(user.id)).await
    }

    async fn delete_line(
        &self,
        order_id: OrderId,
        item_id: ItemId,
        acting_user: Option<UserId>,
    ) -> Result<PurchaseOrder> {
        let mut uow = self.store.begin().await?;
        let mut order = locked_order(&mut uow, order_id).await?;
        order.ensure_items_editable()?;

        if uow.delete_item(order_id, item_id).await? == 0 {
            return Err(AppError::not_found(format!(
                "Line item {} not found on order {}",
                item_id, order_id
            )));
        }

        order.total_amount = refresh_total(&mut uow, order_id).await?;
        record_action(&mut uow, acting_user, actions::item_removed(order_id, item_id)).await?;
        uow.commit().await?;

        info!(
            order_id = order_id,
            item_id = item_id,
            total = %order.total_amount,
            "Line item removed"
        );

        Ok(order)
    }

    /// Move an order to `new_status`
    ///
    /// The transition is checked against the status stored at the time of the
    /// call. An audit entry is written in the same unit of work when an acting
    /// user is given.
    ///
    /// # Errors
    /// * `NotFound` - order does not exist
    /// * `InvalidTransition` - the pair is not in the transition table
    pub async fn change_status(
        &self,
        order_id: OrderId,
        new_status: OrderStatus,
        acting_user: Option<UserId>,
    ) -> Result<PurchaseOrder> {
        let mut uow = self.store.begin().await?;
        let mut order = locked_order(&mut uow, order_id).await?;

        let previous = order.transition_to(new_status).map_err(|err| {
            warn!(
                order_id = order_id,
                current = %order.status,
                requested = %new_status,
                "Rejected status transition"
            );
            err
        })?;

        uow.update_order_status(order_id, new_status).await?;

        let action = actions::status_change(order_id, previous, new_status);
        record_action(&mut uow, acting_user, action).await?;
        uow.commit().await?;

        info!(
            order_id = order_id,
            from = %previous,
            to = %new_status,
            acting_user = ?acting_user,
            "Purchase order status changed"
        );

        Ok(order)
    }

    /// `change_status` on behalf of `user`, after a permission check
    ///
    /// Approval and cancellation need `ApproveOrders`, shipping and delivery
    /// need `ReceiveGoods`, reopening needs `ManageOrders`.
    pub async fn change_status_as(
        &self,
        user: &User,
        order_id: OrderId,
        new_status: OrderStatus,
    ) -> Result<PurchaseOrder> {
        let permission = match new_status {
            OrderStatus::Approved | OrderStatus::Cancelled => Permission::ApproveOrders,
            OrderStatus::Shipped | OrderStatus::Delivered => Permission::ReceiveGoods,
            OrderStatus::Pending => Permission::ManageOrders,
        };
        user.authorize(permission)?;

        self.change_status(order_id, new_status, Some(user.id)).await
    }

    pub async fn approve(&self, order_id: OrderId) -> Result<PurchaseOrder> {
        self.change_status(order_id, OrderStatus::Approved, None).await
    }

    pub async fn ship(&self, order_id: OrderId) -> Result<PurchaseOrder> {
        self.change_status(order_id, OrderStatus::Shipped, None).await
    }

    pub async fn deliver(&self, order_id: OrderId) -> Result<PurchaseOrder> {
        self.change_status(order_id, OrderStatus::Delivered, None).await
    }

    /// Cancel a PENDING or APPROVED order
    ///
    /// # Errors
    /// * `InvalidTransition` - order already shipped, delivered or cancelled
    pub async fn cancel(&self, order_id: OrderId) -> Result<PurchaseOrder> {
        self.change_status(order_id, OrderStatus::Cancelled, None).await
    }

    pub async fn get(&self, order_id: OrderId) -> Result<PurchaseOrder> {
        let mut uow = self.store.begin().await?;
        uow.find_order(order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Purchase order {} not found", order_id)))
    }

    /// Items of an order in insertion order; empty when it has none
    pub async fn get_items(&self, order_id: OrderId) -> Result<Vec<OrderLineItem>> {
        let mut uow = self.store.begin().await?;
        if uow.find_order(order_id).await?.is_none() {
            return Err(AppError::not_found(format!(
                "Purchase order {} not found",
                order_id
            )));
        }

        uow.list_items(order_id).await
    }

    /// Orders of a supplier, newest first
    pub async fn list_by_supplier(&self, supplier_id: SupplierId) -> Result<Vec<PurchaseOrder>> {
        let mut uow = self.store.begin().await?;
        uow.list_orders_by_supplier(supplier_id).await
    }

    /// Change supplier and/or expected delivery date
    ///
    /// # Errors
    /// * `InvalidState` - order is DELIVERED or CANCELLED, or the new supplier
    ///   is inactive
    /// * `NotFound` - the new supplier is not registered
    pub async fn update_details(
        &self,
        order_id: OrderId,
        update: PurchaseOrderUpdate,
    ) -> Result<PurchaseOrder> {
        let mut uow = self.store.begin().await?;
        let mut order = locked_order(&mut uow, order_id).await?;

        if update.is_empty() {
            return Ok(order);
        }

        order.apply_update(&update)?;
        if let Some(supplier_id) = update.supplier_id {
            active_supplier(&mut uow, supplier_id).await?;
        }
        uow.update_order_details(&order).await?;
        uow.commit().await?;

        info!(
            order_id = order_id,
            supplier_id = order.supplier_id,
            expected_delivery_date = ?order.expected_delivery_date,
            "Purchase order details updated"
        );

        Ok(order)
    }

    /// Change discount and/or tax rate of one line
    ///
    /// Pricing adjustments never touch the order total.
    ///
    /// # Errors
    /// * `NotFound` - order or item missing
    /// * `InvalidState` - order is past APPROVED or cancelled
    /// * `Validation` - discount above subtotal, both discount forms given,
    ///   or a negative rate
    pub async fn update_item_pricing(
        &self,
        order_id: OrderId,
        item_id: ItemId,
        update: LineItemPricingUpdate,
    ) -> Result<OrderLineItem> {
        let mut uow = self.store.begin().await?;
        let order = locked_order(&mut uow, order_id).await?;
        order.ensure_items_editable()?;

        let mut item = uow.find_item(order_id, item_id).await?.ok_or_else(|| {
            AppError::not_found(format!(
                "Line item {} not found on order {}",
                item_id, order_id
            ))
        })?;

        if update.is_empty() {
            return Ok(item);
        }

        item.apply_pricing(&update)?;
        uow.update_item_pricing(&item).await?;
        uow.commit().await?;

        info!(
            order_id = order_id,
            item_id = item_id,
            discount = %item.discount,
            tax_rate = %item.tax_rate,
            "Line item pricing updated"
        );

        Ok(item)
    }

    /// Delete an order and its items
    ///
    /// # Errors
    /// * `NotFound` - order does not exist
    /// * `InvalidState` - an invoice has been raised against it
    pub async fn delete(&self, order_id: OrderId) -> Result<()> {
        let mut uow = self.store.begin().await?;
        locked_order(&mut uow, order_id).await?;

        if let Some(invoice) = uow.find_invoice_by_order(order_id).await? {
            return Err(AppError::invalid_state(format!(
                "Order {} is invoiced ({}) and cannot be deleted",
                order_id, invoice.invoice_number
            )));
        }

        uow.delete_order(order_id).await?;
        uow.commit().await?;

        info!(order_id = order_id, "Purchase order deleted");

        Ok(())
    }
}

// Action texts written to the audit trail.

use rust_decimal::Decimal;
use std::fmt::Display;

use crate::core::{InvoiceId, ItemId, OrderId, PaymentId, ProductId, SupplierId};

pub fn order_created(order_id: OrderId, supplier_id: SupplierId) -> String {
    format!("order {} created for supplier {}", order_id, supplier_id)
}

pub fn status_change(order_id: OrderId, from: impl Display, to: impl Display) -> String {
    format!("order {} status {} -> {}", order_id, from, to)
}

pub fn item_added(
    order_id: OrderId,
    item_id: ItemId,
    product_id: ProductId,
    quantity: i32,
) -> String {
    format!(
        "order {} item {} added (product {} x {})",
        order_id, item_id, product_id, quantity
    )
}

pub fn item_removed(order_id: OrderId, item_id: ItemId) -> String {
    format!("order {} item {} removed", order_id, item_id)
}

pub fn invoice_created(invoice_id: InvoiceId, order_id: OrderId, number: &str) -> String {
    format!("invoice {} ({}) raised for order {}", invoice_id, number, order_id)
}

pub fn payment_recorded(
    payment_id: PaymentId,
    invoice_id: InvoiceId,
    amount: Decimal,
    method: impl Display,
) -> String {
    format!(
        "payment {} of {} by {} on invoice {}",
        payment_id, amount, method, invoice_id
    )
}

pub fn supplier_created(supplier_id: SupplierId, name: &str) -> String {
    format!("supplier {} ({}) registered", supplier_id, name)
}

pub fn supplier_deactivated(supplier_id: SupplierId) -> String {
    format!("supplier {} deactivated", supplier_id)
}

pub fn balance_viewed(supplier_id: SupplierId) -> String {
    format!("supplier {} balance viewed", supplier_id)
}

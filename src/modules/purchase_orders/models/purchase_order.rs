// Purchase order header.
//
// `total_amount` is derived: it is the store's sum of quantity × unit_price
// over the order's current line items and is only ever written by the
// recompute step that runs inside the same unit of work as an item change.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::status::OrderStatus;
use crate::core::money;
use crate::core::{AppError, OrderId, Result, SupplierId, UserId};

/// Represents a purchase order header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: OrderId,

    pub supplier_id: SupplierId,

    /// User who raised the order
    pub created_by_id: UserId,

    pub order_date: DateTime<Utc>,

    pub expected_delivery_date: Option<NaiveDate>,

    pub status: OrderStatus,

    /// Sum of quantity × unit_price over current items
    #[serde(with = "money::as_string")]
    pub total_amount: Decimal,
}

/// Input for creating a purchase order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPurchaseOrder {
    pub supplier_id: SupplierId,
    pub created_by_id: UserId,
    pub expected_delivery_date: Option<NaiveDate>,
}

/// Header fields a caller may change; `None` leaves a field untouched.
///
/// `expected_delivery_date: Some(None)` clears the date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrderUpdate {
    pub supplier_id: Option<SupplierId>,
    pub expected_delivery_date: Option<Option<NaiveDate>>,
}

impl NewPurchaseOrder {
    pub fn new(supplier_id: SupplierId, created_by_id: UserId) -> Self {
        Self {
            supplier_id,
            created_by_id,
            expected_delivery_date: None,
        }
    }

    pub fn expected_on(mut self, date: NaiveDate) -> Self {
        self.expected_delivery_date = Some(date);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.supplier_id <= 0 {
            return Err(AppError::validation(format!(
                "Supplier id must be positive, got: {}",
                self.supplier_id
            )));
        }

        if self.created_by_id <= 0 {
            return Err(AppError::validation(format!(
                "Creator id must be positive, got: {}",
                self.created_by_id
            )));
        }

        Ok(())
    }

    /// Header as it is first stored: PENDING with a zero total
    pub fn into_order(self, id: OrderId, order_date: DateTime<Utc>) -> PurchaseOrder {
        PurchaseOrder {
            id,
            supplier_id: self.supplier_id,
            created_by_id: self.created_by_id,
            order_date,
            expected_delivery_date: self.expected_delivery_date,
            status: OrderStatus::Pending,
            total_amount: money::zero(),
        }
    }
}

impl PurchaseOrderUpdate {
    pub fn is_empty(&self) -> bool {
        self.supplier_id.is_none() && self.expected_delivery_date.is_none()
    }
}

impl PurchaseOrder {
    /// Move to `next` if the transition table allows it
    ///
    /// # Returns
    /// * the previous status
    pub fn transition_to(&mut self, next: OrderStatus) -> Result<OrderStatus> {
        if !self.status.can_transition_to(next) {
            return Err(AppError::InvalidTransition {
                current: self.status,
                requested: next,
            });
        }

        let previous = self.status;
        self.status = next;
        Ok(previous)
    }

    /// Fails with `InvalidState` unless line items may still change
    pub fn ensure_items_editable(&self) -> Result<()> {
        if !self.status.accepts_item_changes() {
            return Err(AppError::invalid_state(format!(
                "Items can only change while order #{} is PENDING or APPROVED (currently {})",
                self.id, self.status
            )));
        }

        Ok(())
    }

    /// Apply header changes; terminal orders are frozen
    pub fn apply_update(&mut self, update: &PurchaseOrderUpdate) -> Result<()> {
        if self.status.is_terminal() {
            return Err(AppError::invalid_state(format!(
                "Order #{} is {} and can no longer be edited",
                self.id, self.status
            )));
        }

        if let Some(supplier_id) = update.supplier_id {
            if supplier_id <= 0 {
                return Err(AppError::validation(format!(
                    "Supplier id must be positive, got: {}",
                    supplier_id
                )));
            }
            self.supplier_id = supplier_id;
        }

        if let Some(expected) = update.expected_delivery_date {
            self.expected_delivery_date = expected;
        }

        Ok(())
    }
}

// Supplier invoice raised against a purchase order.
//
// The total is snapshotted when the invoice is created and never recomputed.
// `paid_amount` is a cache of the payments ledger; status is always derived
// from paid vs total through `InvoiceStatus::from_amounts`.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::money;
use crate::core::{AppError, InvoiceId, OrderId, Result, SupplierId};

/// Invoice payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    /// Nothing paid yet
    Unpaid,

    /// Some payments recorded, balance remaining
    PartiallyPaid,

    /// Paid in full (or overpaid)
    Paid,
}

impl Default for InvoiceStatus {
    fn default() -> Self {
        InvoiceStatus::Unpaid
    }
}

impl InvoiceStatus {
    /// Status implied by the amounts alone
    pub fn from_amounts(paid: Decimal, total: Decimal) -> Self {
        if paid <= Decimal::ZERO {
            InvoiceStatus::Unpaid
        } else if paid >= total {
            InvoiceStatus::Paid
        } else {
            InvoiceStatus::PartiallyPaid
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Unpaid => "UNPAID",
            InvoiceStatus::PartiallyPaid => "PARTIALLY_PAID",
            InvoiceStatus::Paid => "PAID",
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "UNPAID" => Ok(InvoiceStatus::Unpaid),
            "PARTIALLY_PAID" => Ok(InvoiceStatus::PartiallyPaid),
            "PAID" => Ok(InvoiceStatus::Paid),
            _ => Err(AppError::validation(format!("Invalid invoice status: {}", s))),
        }
    }
}

/// Represents a supplier invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,

    /// Source purchase order; cleared if the order is removed
    pub order_id: Option<OrderId>,

    pub supplier_id: Option<SupplierId>,

    /// Supplier's document number, unique
    pub invoice_number: String,

    pub invoice_date: NaiveDate,

    pub due_date: Option<NaiveDate>,

    /// Snapshot of the order value at creation
    #[serde(with = "money::as_string")]
    pub total_amount: Decimal,

    /// Cached sum of recorded payments
    #[serde(with = "money::as_string")]
    pub paid_amount: Decimal,

    pub status: InvoiceStatus,

    pub created_at: DateTime<Utc>,
}

impl Invoice {
    /// Balance according to the cached paid amount
    pub fn balance_due(&self) -> Decimal {
        money::quantize(self.total_amount.saturating_sub(self.paid_amount))
    }

    /// Set the cached paid amount and re-derive status
    pub fn settle_to(&mut self, paid: Decimal) {
        self.paid_amount = money::quantize(paid);
        self.status = InvoiceStatus::from_amounts(self.paid_amount, self.total_amount);
    }
}

/// Caller-supplied invoice details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInvoice {
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
}

impl NewInvoice {
    pub fn new(invoice_number: impl Into<String>, invoice_date: NaiveDate) -> Self {
        Self {
            invoice_number: invoice_number.into(),
            invoice_date,
            due_date: None,
        }
    }

    pub fn due_on(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn validate(&self) -> Result<()> {
        let number = self.invoice_number.trim();
        if number.is_empty() {
            return Err(AppError::validation("Invoice number cannot be empty"));
        }

        if number.chars().count() > 50 {
            return Err(AppError::validation(
                "Invoice number cannot exceed 50 characters",
            ));
        }

        if let Some(due) = self.due_date {
            if due < self.invoice_date {
                return Err(AppError::validation(format!(
                    "Due date {} is before invoice date {}",
                    due, self.invoice_date
                )));
            }
        }

        Ok(())
    }
}

/// Invoice row before the store assigns an id
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDraft {
    pub order_id: OrderId,
    pub supplier_id: SupplierId,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl InvoiceDraft {
    pub fn new(
        order_id: OrderId,
        supplier_id: SupplierId,
        details: NewInvoice,
        total_amount: Decimal,
    ) -> Self {
        Self {
            order_id,
            supplier_id,
            invoice_number: details.invoice_number.trim().to_string(),
            invoice_date: details.invoice_date,
            due_date: details.due_date,
            total_amount: money::quantize(total_amount),
            created_at: Utc::now(),
        }
    }

    /// Freshly created invoices start UNPAID with nothing paid
    pub fn into_invoice(self, id: InvoiceId) -> Invoice {
        Invoice {
            id,
            order_id: Some(self.order_id),
            supplier_id: Some(self.supplier_id),
            invoice_number: self.invoice_number,
            invoice_date: self.invoice_date,
            due_date: self.due_date,
            total_amount: self.total_amount,
            paid_amount: money::zero(),
            status: InvoiceStatus::Unpaid,
            created_at: self.created_at,
        }
    }
}

/// Invoice plus the balance computed from the payments ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceWithBalance {
    #[serde(flatten)]
    pub invoice: Invoice,

    #[serde(with = "money::as_string")]
    pub remaining: Decimal,
}

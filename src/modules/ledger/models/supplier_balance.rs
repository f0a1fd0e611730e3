use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::money;
use crate::core::SupplierId;

/// Outstanding vs paid totals across a supplier's invoices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierBalance {
    pub supplier_id: SupplierId,

    /// Σ(total_amount − paid_amount)
    #[serde(with = "money::as_string")]
    pub outstanding: Decimal,

    /// Σ paid_amount
    #[serde(with = "money::as_string")]
    pub paid: Decimal,

    /// Number of invoices aggregated
    pub invoice_count: i64,
}

impl SupplierBalance {
    /// Balance for a supplier with no invoices
    pub fn empty(supplier_id: SupplierId) -> Self {
        Self {
            supplier_id,
            outstanding: money::zero(),
            paid: money::zero(),
            invoice_count: 0,
        }
    }

    pub fn new(
        supplier_id: SupplierId,
        outstanding: Decimal,
        paid: Decimal,
        invoice_count: i64,
    ) -> Self {
        Self {
            supplier_id,
            outstanding: money::quantize(outstanding),
            paid: money::quantize(paid),
            invoice_count,
        }
    }

    /// Σ total_amount
    pub fn invoiced(&self) -> Decimal {
        money::quantize(self.outstanding.saturating_add(self.paid))
    }
}

use async_trait::async_trait;

use crate::core::Result;
use crate::modules::audit::AuditRepository;
use crate::modules::invoices::repositories::InvoiceRepository;
use crate::modules::ledger::repositories::LedgerRepository;
use crate::modules::payments::repositories::PaymentRepository;
use crate::modules::purchase_orders::repositories::{LineItemRepository, PurchaseOrderRepository};
use crate::modules::suppliers::repositories::SupplierRepository;

/// One storage transaction.
///
/// Every read-check-write sequence in a service runs against a single unit of
/// work. Dropping it without `commit` discards all writes made through it.
#[async_trait]
pub trait UnitOfWork:
    SupplierRepository
    + PurchaseOrderRepository
    + LineItemRepository
    + InvoiceRepository
    + PaymentRepository
    + LedgerRepository
    + AuditRepository
    + Send
{
    /// Make every write of this unit visible
    async fn commit(self) -> Result<()>;

    /// Discard every write of this unit
    async fn rollback(self) -> Result<()>;
}

/// Injected storage handle; services own one and open a unit of work per call
#[async_trait]
pub trait Store: Send + Sync {
    type Uow: UnitOfWork;

    /// Start a unit of work
    async fn begin(&self) -> Result<Self::Uow>;
}

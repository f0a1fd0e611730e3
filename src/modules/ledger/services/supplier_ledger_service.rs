use std::sync::Arc;
use tracing::debug;

use crate::core::traits::{Store, UnitOfWork};
use crate::core::{AppError, Permission, Result, SupplierId, User};
use crate::modules::audit::{actions, record_action};
use crate::modules::ledger::models::SupplierBalance;
use crate::modules::ledger::repositories::LedgerRepository;

/// Read-only aggregates over supplier invoices
pub struct SupplierLedgerService<S: Store> {
    store: Arc<S>,
}

impl<S: Store> Clone for SupplierLedgerService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: Store> SupplierLedgerService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Outstanding (Σ total − paid) and paid (Σ paid) across the supplier's
    /// invoices; zeros when it has none
    pub async fn supplier_balance(&self, supplier_id: SupplierId) -> Result<SupplierBalance> {
        if supplier_id <= 0 {
            return Err(AppError::validation(format!(
                "Supplier id must be positive, got: {}",
                supplier_id
            )));
        }

        let mut uow = self.store.begin().await?;
        let balance = uow.supplier_totals(supplier_id).await?;

        debug!(
            supplier_id = supplier_id,
            outstanding = %balance.outstanding,
            paid = %balance.paid,
            invoice_count = balance.invoice_count,
            "Supplier balance computed"
        );

        Ok(balance)
    }

    /// `supplier_balance` for `user`, who needs `ViewLedger`; the read is audited
    pub async fn supplier_balance_as(
        &self,
        user: &User,
        supplier_id: SupplierId,
    ) -> Result<SupplierBalance> {
        user.authorize(Permission::ViewLedger)?;
        let balance = self.supplier_balance(supplier_id).await?;

        let mut uow = self.store.begin().await?;
        record_action(&mut uow, Some(user.id), actions::balance_viewed(supplier_id)).await?;
        uow.commit().await?;

        Ok(balance)
    }
}

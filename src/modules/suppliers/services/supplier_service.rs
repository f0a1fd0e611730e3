use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::core::traits::{Store, UnitOfWork};
use crate::core::{AppError, Permission, Result, SupplierId, User, UserId};
use crate::modules::audit::{actions, record_action};
use crate::modules::suppliers::models::{NewSupplier, Supplier, SupplierStatus};
use crate::modules::suppliers::repositories::SupplierRepository;

/// Supplier directory
pub struct SupplierService<S: Store> {
    store: Arc<S>,
}

impl<S: Store> Clone for SupplierService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: Store> SupplierService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Register an ACTIVE supplier
    ///
    /// # Errors
    /// * `Validation` - blank name, oversized fields or a malformed email
    pub async fn create(&self, supplier: NewSupplier) -> Result<Supplier> {
        self.register(supplier, None).await
    }

    /// `create` on behalf of `user`; needs `ManageOrders` and is audited
    pub async fn create_as(&self, user: &User, supplier: NewSupplier) -> Result<Supplier> {
        user.authorize(Permission::ManageOrders)?;
        self.register(supplier, Some(user.id)).await
    }

    async fn register(
        &self,
        supplier: NewSupplier,
        acting_user: Option<UserId>,
    ) -> Result<Supplier> {
        let supplier = supplier.normalized();
        supplier.validate()?;

        let mut uow = self.store.begin().await?;
        let id = uow.insert_supplier(&supplier, Utc::now()).await?;
        let stored = uow
            .find_supplier(id)
            .await?
            .ok_or_else(|| AppError::storage(format!("Supplier {} missing after insert", id)))?;
        record_action(&mut uow, acting_user, actions::supplier_created(id, &stored.name)).await?;
        uow.commit().await?;

        info!(
            supplier_id = id,
            name = %stored.name,
            acting_user = ?acting_user,
            "Supplier registered"
        );

        Ok(stored)
    }

    pub async fn get(&self, supplier_id: SupplierId) -> Result<Supplier> {
        let mut uow = self.store.begin().await?;
        uow.find_supplier(supplier_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Supplier {} not found", supplier_id)))
    }

    /// ACTIVE suppliers ordered by name
    pub async fn list_active(&self) -> Result<Vec<Supplier>> {
        let mut uow = self.store.begin().await?;
        uow.list_active_suppliers().await
    }

    /// Stop taking new orders for a supplier; existing orders are untouched
    pub async fn deactivate(&self, supplier_id: SupplierId) -> Result<Supplier> {
        self.set_inactive(supplier_id, None).await
    }

    /// `deactivate` on behalf of `user`; needs `ManageOrders` and is audited
    pub async fn deactivate_as(&self, user: &User, supplier_id: SupplierId) -> Result<Supplier> {
        user.authorize(Permission::ManageOrders)?;
        self.set_inactive(supplier_id, Some(user.id)).await
    }

    async fn set_inactive(
        &self,
        supplier_id: SupplierId,
        acting_user: Option<UserId>,
    ) -> Result<Supplier> {
        let mut uow = self.store.begin().await?;
        let mut supplier = uow
            .find_supplier(supplier_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Supplier {} not found", supplier_id)))?;

        if supplier.status == SupplierStatus::Inactive {
            return Ok(supplier);
        }

        uow.set_supplier_status(supplier_id, SupplierStatus::Inactive)
            .await?;
        record_action(&mut uow, acting_user, actions::supplier_deactivated(supplier_id)).await?;
        uow.commit().await?;

        info!(supplier_id = supplier_id, "Supplier deactivated");

        supplier.status = SupplierStatus::Inactive;
        Ok(supplier)
    }
}

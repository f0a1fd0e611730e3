use std::sync::Arc;

use crate::core::traits::Store;
use crate::core::{AppError, Permission, Result, User, UserId};
use crate::modules::audit::models::AuditEntry;
use crate::modules::audit::repositories::AuditRepository;

const MAX_PAGE: i64 = 500;

/// Read access to the audit trail
pub struct AuditService<S: Store> {
    store: Arc<S>,
}

impl<S: Store> Clone for AuditService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

fn check_limit(limit: i64) -> Result<()> {
    if !(1..=MAX_PAGE).contains(&limit) {
        return Err(AppError::validation(format!(
            "Limit must be between 1 and {}, got: {}",
            MAX_PAGE, limit
        )));
    }
    Ok(())
}

impl<S: Store> AuditService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Latest entries across all users; needs `ManageUsers`
    pub async fn recent(&self, viewer: &User, limit: i64) -> Result<Vec<AuditEntry>> {
        viewer.authorize(Permission::ManageUsers)?;
        check_limit(limit)?;

        let mut uow = self.store.begin().await?;
        uow.list_audit_entries(limit).await
    }

    /// Latest entries of `user_id`, newest first
    ///
    /// Users may read their own trail; anyone else's needs `ManageUsers`.
    pub async fn list_for_user(
        &self,
        viewer: &User,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<AuditEntry>> {
        if viewer.id != user_id {
            viewer.authorize(Permission::ManageUsers)?;
        }
        check_limit(limit)?;

        let mut uow = self.store.begin().await?;
        uow.list_user_audit_entries(user_id, limit).await
    }
}

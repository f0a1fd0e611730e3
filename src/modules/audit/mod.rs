// Audit module

pub mod actions;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::AuditEntry;
pub use repositories::AuditRepository;
pub use services::AuditService;

use crate::core::{Result, UserId};

/// Append `action` to the trail when the change is attributed to a user
pub async fn record_action<R: AuditRepository>(
    repo: &mut R,
    acting_user: Option<UserId>,
    action: String,
) -> Result<()> {
    if let Some(user_id) = acting_user {
        repo.insert_audit_entry(Some(user_id), &action).await?;
    }
    Ok(())
}

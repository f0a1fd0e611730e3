use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::UserId;

/// One line of the audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,

    /// Acting user, if the change was attributed
    pub user_id: Option<UserId>,

    /// Human readable description, e.g. `order 4 status PENDING -> APPROVED`
    pub action: String,

    pub created_at: DateTime<Utc>,
}

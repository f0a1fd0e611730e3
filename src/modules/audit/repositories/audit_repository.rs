use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::{Result, UserId};
use crate::modules::audit::models::AuditEntry;
use crate::store::mysql::{db_error, inserted_id, MySqlUnitOfWork};

/// Append-only audit trail
#[async_trait]
pub trait AuditRepository: Send {
    /// # Returns
    /// * the store-assigned entry id
    async fn insert_audit_entry(
        &mut self,
        user_id: Option<UserId>,
        action: &str,
    ) -> Result<i64>;

    /// Most recent entries first
    async fn list_audit_entries(&mut self, limit: i64) -> Result<Vec<AuditEntry>>;

    /// Most recent entries of one user first
    async fn list_user_audit_entries(
        &mut self,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<AuditEntry>>;
}

#[async_trait]
impl AuditRepository for MySqlUnitOfWork {
    async fn insert_audit_entry(
        &mut self,
        user_id: Option<UserId>,
        action: &str,
    ) -> Result<i64> {
        let result =
            sqlx::query("INSERT INTO audit_logs (user_id, action, created_at) VALUES (?, ?, ?)")
                .bind(user_id)
                .bind(action)
                .bind(Utc::now())
                .execute(&mut *self.tx)
                .await
                .map_err(db_error("Failed to write audit entry"))?;

        Ok(inserted_id(&result))
    }

    async fn list_audit_entries(&mut self, limit: i64) -> Result<Vec<AuditEntry>> {
        let rows = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT id, user_id, action, created_at
            FROM audit_logs
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error("Failed to list audit entries"))?;

        Ok(rows.into_iter().map(AuditRow::into_entry).collect())
    }

    async fn list_user_audit_entries(
        &mut self,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<AuditEntry>> {
        let rows = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT id, user_id, action, created_at
            FROM audit_logs
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error("Failed to list audit entries"))?;

        Ok(rows.into_iter().map(AuditRow::into_entry).collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AuditRow {
    id: i64,
    user_id: Option<i64>,
    action: String,
    created_at: DateTime<Utc>,
}

impl AuditRow {
    fn into_entry(self) -> AuditEntry {
        AuditEntry {
            id: self.id,
            user_id: self.user_id,
            action: self.action,
            created_at: self.created_at,
        }
    }
}

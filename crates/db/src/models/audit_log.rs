use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// What an admin did. Stored as its snake_case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    SaveDraft,
    Publish,
    UpdateSettings,
    UpdateStatus,
    Upload,
    ChangePassword,
    ResetPassword,
}

/// One row of the admin action trail
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct AuditLog {
    pub id: Uuid,
    pub user_id: String,
    pub action: String,
    pub entity: String,
    pub entity_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuditLog {
    /// Append an entry. Takes any executor so it can join the caller's
    /// transaction.
    pub async fn record<'e, E>(
        executor: E,
        user_id: &str,
        action: AuditAction,
        entity: &str,
        entity_id: Option<&str>,
    ) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"INSERT INTO audit_log (id, user_id, action, entity, entity_id)
            VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(action.to_string())
        .bind(entity)
        .bind(entity_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Most recent entries first
    pub async fn find_recent(pool: &SqlitePool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, AuditLog>(
            r#"SELECT id, user_id, action, entity, entity_id, created_at
            FROM audit_log
            ORDER BY created_at DESC, rowid DESC
            LIMIT $1"#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names() {
        assert_eq!(AuditAction::SaveDraft.to_string(), "save_draft");
        assert_eq!(AuditAction::UpdateSettings.to_string(), "update_settings");
        assert_eq!(AuditAction::Publish.to_string(), "publish");
    }
}

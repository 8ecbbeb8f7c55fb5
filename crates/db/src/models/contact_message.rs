use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageStatus {
    #[default]
    New,
    Read,
}

/// A submission from the public contact form
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub organization: String,
    pub phone: Option<String>,
    pub project_type: String,
    pub timeline: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated contact form fields ready to be stored
#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateContactMessage {
    pub name: String,
    pub email: String,
    pub organization: String,
    pub phone: Option<String>,
    pub project_type: String,
    pub timeline: Option<String>,
    pub subject: Option<String>,
    pub message: String,
}

const COLUMNS: &str = "id, name, email, organization, phone, project_type, timeline, subject, \
                       message, status, created_at, updated_at";

impl ContactMessage {
    pub async fn create(
        pool: &SqlitePool,
        data: &CreateContactMessage,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ContactMessage>(&format!(
            r#"INSERT INTO contact_messages
                (id, name, email, organization, phone, project_type, timeline, subject, message, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.organization)
        .bind(&data.phone)
        .bind(&data.project_type)
        .bind(&data.timeline)
        .bind(&data.subject)
        .bind(&data.message)
        .bind(MessageStatus::New)
        .fetch_one(pool)
        .await
    }

    /// Newest first, capped at `limit`
    pub async fn find_recent(pool: &SqlitePool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ContactMessage>(&format!(
            r#"SELECT {COLUMNS} FROM contact_messages
            ORDER BY created_at DESC, rowid DESC
            LIMIT $1"#
        ))
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ContactMessage>(&format!(
            "SELECT {COLUMNS} FROM contact_messages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM contact_messages")
            .fetch_one(pool)
            .await
    }

    pub async fn count_by_status(
        pool: &SqlitePool,
        status: MessageStatus,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM contact_messages WHERE status = $1")
            .bind(status)
            .fetch_one(pool)
            .await
    }

    /// Returns `None` when no message has this id.
    pub async fn update_status(
        pool: &SqlitePool,
        id: Uuid,
        status: MessageStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ContactMessage>(&format!(
            r#"UPDATE contact_messages
            SET status = $2, updated_at = datetime('now', 'subsec')
            WHERE id = $1
            RETURNING {COLUMNS}"#
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contact_messages WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

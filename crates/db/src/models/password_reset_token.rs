use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use uuid::Uuid;

/// How long a reset link stays valid
pub const RESET_TOKEN_TTL: Duration = Duration::hours(1);

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PasswordResetToken {
    pub id: Uuid,
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

const COLUMNS: &str = "id, token, user_id, expires_at, used, created_at";

impl PasswordResetToken {
    /// Issue a fresh single-use token for `user_id`.
    pub async fn create(pool: &SqlitePool, user_id: Uuid) -> Result<Self, sqlx::Error> {
        Self::create_with_expiry(pool, user_id, Utc::now() + RESET_TOKEN_TTL).await
    }

    pub async fn create_with_expiry(
        pool: &SqlitePool,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, PasswordResetToken>(&format!(
            r#"INSERT INTO password_reset_tokens (id, token, user_id, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_token(
        pool: &SqlitePool,
        token: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, PasswordResetToken>(&format!(
            "SELECT {COLUMNS} FROM password_reset_tokens WHERE token = $1"
        ))
        .bind(token)
        .fetch_optional(pool)
        .await
    }

    pub async fn mark_used<'e, E>(executor: E, id: Uuid) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query("UPDATE password_reset_tokens SET used = 1 WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Unused and not yet expired at `now`
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.used && now < self.expires_at
    }
}

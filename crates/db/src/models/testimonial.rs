use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

use super::{nullable, patch};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct TestimonialDraft {
    pub id: Uuid,
    pub quote: String,
    pub author: String,
    pub role: Option<String>,
    pub avatar_path: Option<String>,
    pub sort_order: i64,
    pub hidden: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What the public homepage reads
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct PublishedTestimonial {
    pub id: Uuid,
    pub quote: String,
    pub author: String,
    pub role: Option<String>,
    pub avatar_path: Option<String>,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateTestimonial {
    #[serde(default)]
    pub quote: String,
    #[serde(default)]
    pub author: String,
    pub role: Option<String>,
    pub avatar_path: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct UpdateTestimonial {
    pub id: Uuid,
    pub quote: Option<String>,
    pub author: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[ts(optional)]
    pub role: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[ts(optional)]
    pub avatar_path: Option<Option<String>>,
    pub sort_order: Option<i64>,
    pub hidden: Option<bool>,
}

const DRAFT_COLUMNS: &str =
    "id, quote, author, role, avatar_path, sort_order, hidden, created_at, updated_at";

impl TestimonialDraft {
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, TestimonialDraft>(&format!(
            "SELECT {DRAFT_COLUMNS} FROM testimonial_drafts ORDER BY sort_order ASC, created_at ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateTestimonial,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, TestimonialDraft>(&format!(
            r#"INSERT INTO testimonial_drafts (id, quote, author, role, avatar_path, sort_order, hidden)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {DRAFT_COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(data.quote.trim())
        .bind(data.author.trim())
        .bind(&data.role)
        .bind(&data.avatar_path)
        .bind(data.sort_order)
        .bind(data.hidden)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        data: &UpdateTestimonial,
    ) -> Result<Option<Self>, sqlx::Error> {
        let (role_supplied, role) = patch(&data.role);
        let (avatar_supplied, avatar_path) = patch(&data.avatar_path);

        sqlx::query_as::<_, TestimonialDraft>(&format!(
            r#"UPDATE testimonial_drafts
            SET quote = COALESCE($2, quote),
                author = COALESCE($3, author),
                role = CASE WHEN $4 THEN $5 ELSE role END,
                avatar_path = CASE WHEN $6 THEN $7 ELSE avatar_path END,
                sort_order = COALESCE($8, sort_order),
                hidden = COALESCE($9, hidden),
                updated_at = datetime('now', 'subsec')
            WHERE id = $1
            RETURNING {DRAFT_COLUMNS}"#
        ))
        .bind(data.id)
        .bind(data.quote.as_deref().map(str::trim))
        .bind(data.author.as_deref().map(str::trim))
        .bind(role_supplied)
        .bind(role.cloned())
        .bind(avatar_supplied)
        .bind(avatar_path.cloned())
        .bind(data.sort_order)
        .bind(data.hidden)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM testimonial_drafts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Swap the published set for the visible drafts.
    pub async fn publish(conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
        sqlx::query("DELETE FROM testimonials_published")
            .execute(&mut *conn)
            .await?;

        let result = sqlx::query(
            r#"INSERT INTO testimonials_published (id, quote, author, role, avatar_path, sort_order)
            SELECT id, quote, author, role, avatar_path, sort_order
            FROM testimonial_drafts
            WHERE hidden = 0
            ORDER BY sort_order ASC, created_at ASC"#,
        )
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }
}

impl PublishedTestimonial {
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, PublishedTestimonial>(
            r#"SELECT id, quote, author, role, avatar_path, sort_order, created_at
            FROM testimonials_published
            ORDER BY sort_order ASC, rowid ASC"#,
        )
        .fetch_all(pool)
        .await
    }
}

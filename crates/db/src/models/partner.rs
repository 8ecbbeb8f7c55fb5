//! Partner logos shown on the homepage strip.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

use super::{nullable, patch};

/// Editable partner entry. Hidden drafts are skipped on publish.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct PartnerDraft {
    pub id: Uuid,
    pub name: String,
    pub url: Option<String>,
    pub logo_path: Option<String>,
    pub sort_order: i64,
    pub hidden: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct PublishedPartner {
    pub id: Uuid,
    pub name: String,
    pub url: Option<String>,
    pub logo_path: Option<String>,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreatePartner {
    #[serde(default)]
    pub name: String,
    pub url: Option<String>,
    pub logo_path: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default)]
    pub hidden: bool,
}

/// Absent keys keep their value; `null` clears `url` and `logo_path`.
#[derive(Debug, Clone, Deserialize, TS)]
pub struct UpdatePartner {
    pub id: Uuid,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[ts(optional)]
    pub url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[ts(optional)]
    pub logo_path: Option<Option<String>>,
    pub sort_order: Option<i64>,
    pub hidden: Option<bool>,
}

const DRAFT_COLUMNS: &str =
    "id, name, url, logo_path, sort_order, hidden, created_at, updated_at";
const PUBLISHED_COLUMNS: &str = "id, name, url, logo_path, sort_order, created_at";

impl PartnerDraft {
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, PartnerDraft>(&format!(
            "SELECT {DRAFT_COLUMNS} FROM partner_drafts ORDER BY sort_order ASC, created_at ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreatePartner) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, PartnerDraft>(&format!(
            r#"INSERT INTO partner_drafts (id, name, url, logo_path, sort_order, hidden)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {DRAFT_COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(data.name.trim())
        .bind(&data.url)
        .bind(&data.logo_path)
        .bind(data.sort_order)
        .bind(data.hidden)
        .fetch_one(pool)
        .await
    }

    /// `None` for an unknown id.
    pub async fn update(
        pool: &SqlitePool,
        data: &UpdatePartner,
    ) -> Result<Option<Self>, sqlx::Error> {
        let (url_supplied, url) = patch(&data.url);
        let (logo_supplied, logo_path) = patch(&data.logo_path);

        sqlx::query_as::<_, PartnerDraft>(&format!(
            r#"UPDATE partner_drafts
            SET name = COALESCE($2, name),
                url = CASE WHEN $3 THEN $4 ELSE url END,
                logo_path = CASE WHEN $5 THEN $6 ELSE logo_path END,
                sort_order = COALESCE($7, sort_order),
                hidden = COALESCE($8, hidden),
                updated_at = datetime('now', 'subsec')
            WHERE id = $1
            RETURNING {DRAFT_COLUMNS}"#
        ))
        .bind(data.id)
        .bind(data.name.as_deref().map(str::trim))
        .bind(url_supplied)
        .bind(url.cloned())
        .bind(logo_supplied)
        .bind(logo_path.cloned())
        .bind(data.sort_order)
        .bind(data.hidden)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM partner_drafts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Replace the published set with every visible draft. Returns how many
    /// rows were published.
    pub async fn publish(conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
        sqlx::query("DELETE FROM partners_published")
            .execute(&mut *conn)
            .await?;

        let result = sqlx::query(
            r#"INSERT INTO partners_published (id, name, url, logo_path, sort_order)
            SELECT id, name, url, logo_path, sort_order
            FROM partner_drafts
            WHERE hidden = 0
            ORDER BY sort_order ASC, created_at ASC"#,
        )
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }
}

impl PublishedPartner {
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, PublishedPartner>(&format!(
            "SELECT {PUBLISHED_COLUMNS} FROM partners_published ORDER BY sort_order ASC, rowid ASC"
        ))
        .fetch_all(pool)
        .await
    }
}

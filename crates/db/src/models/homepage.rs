use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use ts_rs::TS;

use super::{ContentStage, SINGLETON_ID};

/// Hero copy for the landing page. Same shape in the draft and published
/// tables.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct HomepageContent {
    pub headline: String,
    pub subheadline: Option<String>,
    pub primary_cta_text: Option<String>,
    pub primary_cta_url: Option<String>,
    pub secondary_cta_text: Option<String>,
    pub secondary_cta_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct SaveHomepageDraft {
    #[serde(default)]
    pub headline: String,
    pub subheadline: Option<String>,
    pub primary_cta_text: Option<String>,
    pub primary_cta_url: Option<String>,
    pub secondary_cta_text: Option<String>,
    pub secondary_cta_url: Option<String>,
}

const COLUMNS: &str = "headline, subheadline, primary_cta_text, primary_cta_url, \
                       secondary_cta_text, secondary_cta_url, updated_at";

fn table(stage: ContentStage) -> &'static str {
    match stage {
        ContentStage::Draft => "homepage_draft",
        ContentStage::Published => "homepage_published",
    }
}

impl HomepageContent {
    pub async fn find(
        pool: &SqlitePool,
        stage: ContentStage,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, HomepageContent>(&format!(
            "SELECT {COLUMNS} FROM {} WHERE id = $1",
            table(stage)
        ))
        .bind(SINGLETON_ID)
        .fetch_optional(pool)
        .await
    }

    pub async fn save_draft(
        pool: &SqlitePool,
        data: &SaveHomepageDraft,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, HomepageContent>(&format!(
            r#"INSERT INTO homepage_draft
                (id, headline, subheadline, primary_cta_text, primary_cta_url,
                 secondary_cta_text, secondary_cta_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT(id) DO UPDATE SET
                headline = excluded.headline,
                subheadline = excluded.subheadline,
                primary_cta_text = excluded.primary_cta_text,
                primary_cta_url = excluded.primary_cta_url,
                secondary_cta_text = excluded.secondary_cta_text,
                secondary_cta_url = excluded.secondary_cta_url,
                updated_at = datetime('now', 'subsec')
            RETURNING {COLUMNS}"#
        ))
        .bind(SINGLETON_ID)
        .bind(data.headline.trim())
        .bind(&data.subheadline)
        .bind(&data.primary_cta_text)
        .bind(&data.primary_cta_url)
        .bind(&data.secondary_cta_text)
        .bind(&data.secondary_cta_url)
        .fetch_one(pool)
        .await
    }

    /// Copy the draft row over the published row. Returns `None` when there
    /// is no draft to publish. Meant to run inside the caller's transaction.
    pub async fn publish(conn: &mut SqliteConnection) -> Result<Option<Self>, sqlx::Error> {
        let draft = sqlx::query_as::<_, HomepageContent>(&format!(
            "SELECT {COLUMNS} FROM homepage_draft WHERE id = $1"
        ))
        .bind(SINGLETON_ID)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(draft) = draft else {
            return Ok(None);
        };

        let published = sqlx::query_as::<_, HomepageContent>(&format!(
            r#"INSERT INTO homepage_published
                (id, headline, subheadline, primary_cta_text, primary_cta_url,
                 secondary_cta_text, secondary_cta_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT(id) DO UPDATE SET
                headline = excluded.headline,
                subheadline = excluded.subheadline,
                primary_cta_text = excluded.primary_cta_text,
                primary_cta_url = excluded.primary_cta_url,
                secondary_cta_text = excluded.secondary_cta_text,
                secondary_cta_url = excluded.secondary_cta_url,
                updated_at = datetime('now', 'subsec')
            RETURNING {COLUMNS}"#
        ))
        .bind(SINGLETON_ID)
        .bind(&draft.headline)
        .bind(&draft.subheadline)
        .bind(&draft.primary_cta_text)
        .bind(&draft.primary_cta_url)
        .bind(&draft.secondary_cta_text)
        .bind(&draft.secondary_cta_url)
        .fetch_one(&mut *conn)
        .await?;

        Ok(Some(published))
    }
}

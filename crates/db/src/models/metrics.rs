use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use ts_rs::TS;

use super::{ContentStage, SINGLETON_ID};

pub const DEFAULT_CURRENCY: &str = "USD";

/// Headline numbers shown on the homepage
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct SiteMetrics {
    pub years_experience: i64,
    pub projects_led: i64,
    pub countries: i64,
    pub portfolio_currency: String,
    pub portfolio_value: i64,
    pub updated_at: DateTime<Utc>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct SaveMetricsDraft {
    #[serde(default)]
    pub years_experience: i64,
    #[serde(default)]
    pub projects_led: i64,
    #[serde(default)]
    pub countries: i64,
    #[serde(default = "default_currency")]
    pub portfolio_currency: String,
    #[serde(default)]
    pub portfolio_value: i64,
}

const COLUMNS: &str =
    "years_experience, projects_led, countries, portfolio_currency, portfolio_value, updated_at";

const UPSERT_TAIL: &str = r#"ON CONFLICT(id) DO UPDATE SET
        years_experience = excluded.years_experience,
        projects_led = excluded.projects_led,
        countries = excluded.countries,
        portfolio_currency = excluded.portfolio_currency,
        portfolio_value = excluded.portfolio_value,
        updated_at = datetime('now', 'subsec')"#;

impl SiteMetrics {
    pub async fn find(
        pool: &SqlitePool,
        stage: ContentStage,
    ) -> Result<Option<Self>, sqlx::Error> {
        let table = match stage {
            ContentStage::Draft => "metrics_draft",
            ContentStage::Published => "metrics_published",
        };
        sqlx::query_as::<_, SiteMetrics>(&format!("SELECT {COLUMNS} FROM {table} WHERE id = $1"))
            .bind(SINGLETON_ID)
            .fetch_optional(pool)
            .await
    }

    pub async fn save_draft(
        pool: &SqlitePool,
        data: &SaveMetricsDraft,
    ) -> Result<Self, sqlx::Error> {
        let currency = match data.portfolio_currency.trim() {
            "" => DEFAULT_CURRENCY.to_string(),
            c => c.to_uppercase(),
        };
        sqlx::query_as::<_, SiteMetrics>(&format!(
            r#"INSERT INTO metrics_draft
                (id, years_experience, projects_led, countries, portfolio_currency, portfolio_value)
            VALUES ($1, $2, $3, $4, $5, $6)
            {UPSERT_TAIL}
            RETURNING {COLUMNS}"#
        ))
        .bind(SINGLETON_ID)
        .bind(data.years_experience)
        .bind(data.projects_led)
        .bind(data.countries)
        .bind(currency)
        .bind(data.portfolio_value)
        .fetch_one(pool)
        .await
    }

    /// Copy the draft row into the published table. `None` without a draft.
    pub async fn publish(conn: &mut SqliteConnection) -> Result<Option<Self>, sqlx::Error> {
        let Some(draft) = sqlx::query_as::<_, SiteMetrics>(&format!(
            "SELECT {COLUMNS} FROM metrics_draft WHERE id = $1"
        ))
        .bind(SINGLETON_ID)
        .fetch_optional(&mut *conn)
        .await?
        else {
            return Ok(None);
        };

        sqlx::query_as::<_, SiteMetrics>(&format!(
            r#"INSERT INTO metrics_published
                (id, years_experience, projects_led, countries, portfolio_currency, portfolio_value)
            VALUES ($1, $2, $3, $4, $5, $6)
            {UPSERT_TAIL}
            RETURNING {COLUMNS}"#
        ))
        .bind(SINGLETON_ID)
        .bind(draft.years_experience)
        .bind(draft.projects_led)
        .bind(draft.countries)
        .bind(&draft.portfolio_currency)
        .bind(draft.portfolio_value)
        .fetch_one(&mut *conn)
        .await
        .map(Some)
    }
}

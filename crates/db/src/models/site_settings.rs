use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;

use super::{nullable, patch};

/// Primary key of the single settings row
pub const SETTINGS_ID: &str = "default";

#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize, TS)]
pub struct SiteSettings {
    pub site_title: Option<String>,
    pub primary_color: Option<String>,
    pub sender_name: Option<String>,
    pub sender_email: Option<String>,
    pub public_email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub linkedin_url: Option<String>,
    pub website_url: Option<String>,
    pub logo_path: Option<String>,
    pub favicon_path: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields to change. Absent keys leave the stored value alone; an explicit
/// `null` clears it.
#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct UpdateSiteSettings {
    #[serde(default, deserialize_with = "nullable")]
    #[ts(optional)]
    pub site_title: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[ts(optional)]
    pub primary_color: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[ts(optional)]
    pub sender_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[ts(optional)]
    pub sender_email: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[ts(optional)]
    pub public_email: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[ts(optional)]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[ts(optional)]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[ts(optional)]
    pub linkedin_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[ts(optional)]
    pub website_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[ts(optional)]
    pub logo_path: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[ts(optional)]
    pub favicon_path: Option<Option<String>>,
}

const COLUMNS: &str = "site_title, primary_color, sender_name, sender_email, public_email, \
                       phone, location, linkedin_url, website_url, logo_path, favicon_path, \
                       updated_at";

impl SiteSettings {
    /// Stored settings, or an all-empty value when nothing was saved yet.
    pub async fn get(pool: &SqlitePool) -> Result<Self, sqlx::Error> {
        let settings = sqlx::query_as::<_, SiteSettings>(&format!(
            "SELECT {COLUMNS} FROM site_settings WHERE id = $1"
        ))
        .bind(SETTINGS_ID)
        .fetch_optional(pool)
        .await?;
        Ok(settings.unwrap_or_default())
    }

    pub async fn upsert(
        pool: &SqlitePool,
        data: &UpdateSiteSettings,
    ) -> Result<Self, sqlx::Error> {
        let patches = [
            patch(&data.site_title),
            patch(&data.primary_color),
            patch(&data.sender_name),
            patch(&data.sender_email),
            patch(&data.public_email),
            patch(&data.phone),
            patch(&data.location),
            patch(&data.linkedin_url),
            patch(&data.website_url),
            patch(&data.logo_path),
            patch(&data.favicon_path),
        ];

        let sql = format!(
            r#"INSERT INTO site_settings
                (id, site_title, primary_color, sender_name, sender_email, public_email,
                 phone, location, linkedin_url, website_url, logo_path, favicon_path)
            VALUES ($1, $3, $5, $7, $9, $11, $13, $15, $17, $19, $21, $23)
            ON CONFLICT(id) DO UPDATE SET
                site_title = CASE WHEN $2 THEN excluded.site_title ELSE site_settings.site_title END,
                primary_color = CASE WHEN $4 THEN excluded.primary_color ELSE site_settings.primary_color END,
                sender_name = CASE WHEN $6 THEN excluded.sender_name ELSE site_settings.sender_name END,
                sender_email = CASE WHEN $8 THEN excluded.sender_email ELSE site_settings.sender_email END,
                public_email = CASE WHEN $10 THEN excluded.public_email ELSE site_settings.public_email END,
                phone = CASE WHEN $12 THEN excluded.phone ELSE site_settings.phone END,
                location = CASE WHEN $14 THEN excluded.location ELSE site_settings.location END,
                linkedin_url = CASE WHEN $16 THEN excluded.linkedin_url ELSE site_settings.linkedin_url END,
                website_url = CASE WHEN $18 THEN excluded.website_url ELSE site_settings.website_url END,
                logo_path = CASE WHEN $20 THEN excluded.logo_path ELSE site_settings.logo_path END,
                favicon_path = CASE WHEN $22 THEN excluded.favicon_path ELSE site_settings.favicon_path END,
                updated_at = datetime('now', 'subsec')
            RETURNING {COLUMNS}"#
        );

        let mut query = sqlx::query_as::<_, SiteSettings>(&sql).bind(SETTINGS_ID);
        for (supplied, value) in patches {
            query = query.bind(supplied).bind(value.cloned());
        }
        query.fetch_one(pool).await
    }
}

//! Portfolio case studies and their presentation templates.
//!
//! Projects are edited directly (no draft table); the `published` flag decides
//! whether the public portfolio shows them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type, types::Json};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Ongoing,
    Completed,
}

/// Visual theme a project card is rendered with
#[derive(Debug, Clone, Copy, Serialize, TS)]
pub struct ProjectTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub gradient: &'static str,
    pub bg_color: &'static str,
    pub text_color: &'static str,
    pub icon_bg: &'static str,
    pub description: &'static str,
}

pub const DEFAULT_TEMPLATE_ID: &str = "blue-energy";

pub const PROJECT_TEMPLATES: &[ProjectTemplate] = &[
    ProjectTemplate {
        id: "blue-energy",
        name: "Energy & Infrastructure",
        icon: "Building",
        gradient: "from-blue-500 to-blue-600",
        bg_color: "bg-blue-50",
        text_color: "text-blue-700",
        icon_bg: "bg-blue-100",
        description: "Energy, infrastructure, and development projects",
    },
    ProjectTemplate {
        id: "purple-innovation",
        name: "Innovation & Technology",
        icon: "TrendingUp",
        gradient: "from-purple-500 to-purple-600",
        bg_color: "bg-purple-50",
        text_color: "text-purple-700",
        icon_bg: "bg-purple-100",
        description: "Tech, innovation, and research projects",
    },
    ProjectTemplate {
        id: "green-sustainability",
        name: "Sustainability & Environment",
        icon: "Globe",
        gradient: "from-green-500 to-green-600",
        bg_color: "bg-green-50",
        text_color: "text-green-700",
        icon_bg: "bg-green-100",
        description: "Environmental and sustainability initiatives",
    },
    ProjectTemplate {
        id: "orange-social",
        name: "Social Impact & Community",
        icon: "GraduationCap",
        gradient: "from-orange-500 to-orange-600",
        bg_color: "bg-orange-50",
        text_color: "text-orange-700",
        icon_bg: "bg-orange-100",
        description: "Social impact and community development",
    },
    ProjectTemplate {
        id: "teal-evaluation",
        name: "Research & Evaluation",
        icon: "BarChart3",
        gradient: "from-teal-500 to-teal-600",
        bg_color: "bg-teal-50",
        text_color: "text-teal-700",
        icon_bg: "bg-teal-100",
        description: "Research, evaluation, and assessment projects",
    },
    ProjectTemplate {
        id: "indigo-gender",
        name: "Gender & Inclusion",
        icon: "Users",
        gradient: "from-indigo-500 to-indigo-600",
        bg_color: "bg-indigo-50",
        text_color: "text-indigo-700",
        icon_bg: "bg-indigo-100",
        description: "Gender equality and inclusion initiatives",
    },
];

impl ProjectTemplate {
    /// Look up a template, falling back to the first one for unknown ids.
    pub fn resolve(id: &str) -> &'static ProjectTemplate {
        PROJECT_TEMPLATES
            .iter()
            .find(|t| t.id == id)
            .unwrap_or(&PROJECT_TEMPLATES[0])
    }

    /// Known template id for `requested`, or the default.
    pub fn normalize_id(requested: Option<&str>) -> String {
        requested
            .map(|id| Self::resolve(id).id)
            .unwrap_or(DEFAULT_TEMPLATE_ID)
            .to_string()
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub client: String,
    pub duration: String,
    pub overview: String,
    /// Bullet points describing the consultant's role
    #[ts(type = "Array<string>")]
    pub role: Json<Vec<String>>,
    /// Bullet points describing outcomes
    #[ts(type = "Array<string>")]
    pub impact: Json<Vec<String>>,
    pub template_id: String,
    pub stats_value: String,
    pub stats_label: String,
    pub status: ProjectStatus,
    /// Percent complete; only set while ongoing
    pub progress: Option<i64>,
    pub sort_order: i64,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateProject {
    pub title: String,
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub role: Vec<String>,
    #[serde(default)]
    pub impact: Vec<String>,
    pub template_id: Option<String>,
    #[serde(default)]
    pub stats_value: String,
    #[serde(default)]
    pub stats_label: String,
    #[serde(default)]
    pub status: ProjectStatus,
    pub progress: Option<i64>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default)]
    pub published: bool,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct UpdateProject {
    pub title: Option<String>,
    pub client: Option<String>,
    pub duration: Option<String>,
    pub overview: Option<String>,
    pub role: Option<Vec<String>>,
    pub impact: Option<Vec<String>>,
    pub template_id: Option<String>,
    pub stats_value: Option<String>,
    pub stats_label: Option<String>,
    pub status: Option<ProjectStatus>,
    pub progress: Option<i64>,
    pub sort_order: Option<i64>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct ProjectStats {
    pub value: String,
    pub label: String,
}

/// A published project as the public portfolio page renders it
#[derive(Debug, Clone, Serialize, TS)]
pub struct PortfolioProject {
    pub id: Uuid,
    pub title: String,
    pub client: String,
    pub duration: String,
    pub challenge: String,
    pub role: Vec<String>,
    pub impact: Vec<String>,
    pub color: String,
    pub bg_color: String,
    pub text_color: String,
    pub icon_bg: String,
    pub icon: String,
    pub stats: ProjectStats,
    pub status: ProjectStatus,
    pub progress: i64,
}

impl From<Project> for PortfolioProject {
    fn from(project: Project) -> Self {
        let template = ProjectTemplate::resolve(&project.template_id);
        let progress = match project.status {
            ProjectStatus::Ongoing => project.progress.unwrap_or(0),
            ProjectStatus::Completed => 100,
        };
        PortfolioProject {
            id: project.id,
            title: project.title,
            client: project.client,
            duration: project.duration,
            challenge: project.overview,
            role: project.role.0,
            impact: project.impact.0,
            color: template.gradient.to_string(),
            bg_color: template.bg_color.to_string(),
            text_color: template.text_color.to_string(),
            icon_bg: template.icon_bg.to_string(),
            icon: template.icon.to_string(),
            stats: ProjectStats {
                value: project.stats_value,
                label: project.stats_label,
            },
            status: project.status,
            progress,
        }
    }
}

/// Progress is only meaningful while a project is ongoing.
fn progress_for(status: ProjectStatus, progress: Option<i64>) -> Option<i64> {
    match status {
        ProjectStatus::Ongoing => Some(progress.unwrap_or(0)),
        ProjectStatus::Completed => None,
    }
}

const COLUMNS: &str = "id, title, client, duration, overview, role, impact, template_id, \
                       stats_value, stats_label, status, progress, sort_order, published, \
                       created_at, updated_at";

impl Project {
    /// All projects for the admin list
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {COLUMNS} FROM projects ORDER BY sort_order ASC, created_at ASC"
        ))
        .fetch_all(pool)
        .await
    }

    /// Published projects in display order
    pub async fn find_published(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            r#"SELECT {COLUMNS} FROM projects
            WHERE published = 1
            ORDER BY sort_order ASC, created_at ASC"#
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!("SELECT {COLUMNS} FROM projects WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM projects")
            .fetch_one(pool)
            .await
    }

    pub async fn count_published(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE published = 1")
            .fetch_one(pool)
            .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateProject) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            r#"INSERT INTO projects
                (id, title, client, duration, overview, role, impact, template_id,
                 stats_value, stats_label, status, progress, sort_order, published)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.client)
        .bind(&data.duration)
        .bind(&data.overview)
        .bind(Json(&data.role))
        .bind(Json(&data.impact))
        .bind(ProjectTemplate::normalize_id(data.template_id.as_deref()))
        .bind(&data.stats_value)
        .bind(&data.stats_label)
        .bind(data.status)
        .bind(progress_for(data.status, data.progress))
        .bind(data.sort_order)
        .bind(data.published)
        .fetch_one(pool)
        .await
    }

    /// Merge `data` over the stored row. Returns `None` for an unknown id.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let Some(existing) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let status = data.status.unwrap_or(existing.status);
        let progress = progress_for(status, data.progress.or(existing.progress));
        let template_id = match data.template_id.as_deref() {
            Some(requested) => ProjectTemplate::normalize_id(Some(requested)),
            None => existing.template_id.clone(),
        };

        sqlx::query_as::<_, Project>(&format!(
            r#"UPDATE projects
            SET title = $2, client = $3, duration = $4, overview = $5, role = $6, impact = $7,
                template_id = $8, stats_value = $9, stats_label = $10, status = $11,
                progress = $12, sort_order = $13, published = $14,
                updated_at = datetime('now', 'subsec')
            WHERE id = $1
            RETURNING {COLUMNS}"#
        ))
        .bind(id)
        .bind(data.title.as_ref().unwrap_or(&existing.title))
        .bind(data.client.as_ref().unwrap_or(&existing.client))
        .bind(data.duration.as_ref().unwrap_or(&existing.duration))
        .bind(data.overview.as_ref().unwrap_or(&existing.overview))
        .bind(Json(data.role.as_ref().unwrap_or(&existing.role.0)))
        .bind(Json(data.impact.as_ref().unwrap_or(&existing.impact.0)))
        .bind(template_id)
        .bind(data.stats_value.as_ref().unwrap_or(&existing.stats_value))
        .bind(data.stats_label.as_ref().unwrap_or(&existing.stats_label))
        .bind(status)
        .bind(progress)
        .bind(data.sort_order.unwrap_or(existing.sort_order))
        .bind(data.published.unwrap_or(existing.published))
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

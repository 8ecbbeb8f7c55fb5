//! Read-only endpoints the public site renders from.

use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use db::models::{
    ContentStage,
    homepage::HomepageContent,
    metrics::SiteMetrics,
    partner::PublishedPartner,
    project::{PROJECT_TEMPLATES, PortfolioProject, Project, ProjectTemplate},
    site_settings::SiteSettings,
    testimonial::PublishedTestimonial,
};
use serde::Serialize;
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

/// Everything the landing page needs in one call
#[derive(Debug, Serialize, TS)]
pub struct HomeResponse {
    pub homepage: Option<HomepageContent>,
    pub metrics: Option<SiteMetrics>,
    pub partners: Vec<PublishedPartner>,
    pub testimonials: Vec<PublishedTestimonial>,
}

pub async fn get_site(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<SiteSettings>>, ApiError> {
    let settings = SiteSettings::get(state.pool()).await?;
    Ok(ResponseJson(ApiResponse::success(settings)))
}

pub async fn get_home(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<HomeResponse>>, ApiError> {
    let pool = state.pool();
    let (homepage, metrics, partners, testimonials) = tokio::try_join!(
        HomepageContent::find(pool, ContentStage::Published),
        SiteMetrics::find(pool, ContentStage::Published),
        PublishedPartner::list(pool),
        PublishedTestimonial::list(pool),
    )?;

    Ok(ResponseJson(ApiResponse::success(HomeResponse {
        homepage,
        metrics,
        partners,
        testimonials,
    })))
}

pub async fn get_portfolio_projects(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<PortfolioProject>>>, ApiError> {
    let projects = Project::find_published(state.pool())
        .await?
        .into_iter()
        .map(PortfolioProject::from)
        .collect();
    Ok(ResponseJson(ApiResponse::success(projects)))
}

pub async fn get_templates() -> ResponseJson<ApiResponse<&'static [ProjectTemplate]>> {
    ResponseJson(ApiResponse::success(PROJECT_TEMPLATES))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/site", get(get_site))
        .route("/home", get(get_home))
        .route("/portfolio/projects", get(get_portfolio_projects))
        .route("/portfolio/templates", get(get_templates))
}

//! Write TypeScript bindings for the API types.
//!
//! Usage:
//!   cargo run --bin generate-types [-- <out dir>]
//!
//! Defaults to `frontend/src/types/api`. Dependencies of each type are
//! exported alongside it.

use std::path::{Path, PathBuf};

use anyhow::Context;
use db::models::{
    audit_log::AuditLog,
    contact_message::ContactMessage,
    homepage::{HomepageContent, SaveHomepageDraft},
    metrics::{SaveMetricsDraft, SiteMetrics},
    partner::{CreatePartner, UpdatePartner},
    project::{CreateProject, PortfolioProject, Project, ProjectTemplate, UpdateProject},
    site_settings::{SiteSettings, UpdateSiteSettings},
    testimonial::{CreateTestimonial, UpdateTestimonial},
};
use server::routes::{
    admin::{dashboard::DashboardSummary, messages::Inbox, partners::PublishSummary},
    auth::{LoginResponse, SessionInfo},
    public::HomeResponse,
    upload::UploadResponse,
};
use ts_rs::TS;

const DEFAULT_OUT_DIR: &str = "frontend/src/types/api";

fn export_bindings(out_dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    macro_rules! export {
        ($($ty:ty),+ $(,)?) => {
            $(
                <$ty as TS>::export_all_to(out_dir)
                    .with_context(|| format!("exporting {}", <$ty as TS>::name()))?;
            )+
        };
    }

    export!(
        // Responses
        HomeResponse,
        PortfolioProject,
        ProjectTemplate,
        SiteSettings,
        Inbox,
        DashboardSummary,
        PublishSummary,
        LoginResponse,
        SessionInfo,
        UploadResponse,
        AuditLog,
        Project,
        ContactMessage,
        HomepageContent,
        SiteMetrics,
        // Admin request bodies
        CreateProject,
        UpdateProject,
        UpdateSiteSettings,
        SaveHomepageDraft,
        SaveMetricsDraft,
        CreatePartner,
        UpdatePartner,
        CreateTestimonial,
        UpdateTestimonial,
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR));
    export_bindings(&out_dir)?;
    println!("TypeScript bindings written to {}", out_dir.display());
    Ok(())
}

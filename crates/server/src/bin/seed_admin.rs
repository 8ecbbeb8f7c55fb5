//! Create the admin account and optionally import portfolio projects.
//!
//! Usage:
//!   cargo run --bin seed-admin
//!   cargo run --bin seed-admin -- --projects seed/projects.json [--force]
//!
//! Importing into a database that already has projects requires `--force`,
//! which deletes the existing ones first.
//!
//! The password comes from `FOLIO_ADMIN_PASSWORD` (default `password123`) and
//! must be changed at first login.

use std::{env, path::PathBuf};

use anyhow::{Context, bail};
use db::{
    DBService,
    models::{
        project::{CreateProject, Project},
        user::{CreateUser, User},
    },
};
use services::services::{auth::hash_password, config::ServerConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_PASSWORD: &str = "password123";

struct Args {
    projects: Option<PathBuf>,
    force: bool,
}

fn parse_args() -> anyhow::Result<Option<Args>> {
    let mut args = env::args().skip(1);
    let mut projects = None;
    let mut force = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                println!("Usage: seed-admin [--projects <file.json>] [--force]");
                return Ok(None);
            }
            "--projects" => {
                let path = args.next().context("--projects needs a file path")?;
                projects = Some(PathBuf::from(path));
            }
            "--force" => force = true,
            other => bail!("Unknown argument: {other}"),
        }
    }

    Ok(Some(Args { projects, force }))
}

async fn seed_admin(db: &DBService, config: &ServerConfig) -> anyhow::Result<()> {
    if User::find_by_email(&db.pool, &config.admin_email)
        .await?
        .is_some()
    {
        info!(email = %config.admin_email, "Admin user already exists");
        return Ok(());
    }

    let password = env::var("FOLIO_ADMIN_PASSWORD")
        .ok()
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| {
            warn!("FOLIO_ADMIN_PASSWORD not set; using the default password");
            DEFAULT_PASSWORD.to_string()
        });

    let user = User::create(
        &db.pool,
        &CreateUser {
            email: config.admin_email.clone(),
            name: Some("Admin".to_string()),
            password_hash: hash_password(&password).await?,
            must_change_password: true,
        },
    )
    .await?;

    info!(user_id = %user.id, email = %user.email, "Seeded admin user");
    Ok(())
}

fn parse_projects(raw: &str) -> serde_json::Result<Vec<CreateProject>> {
    serde_json::from_str(raw)
}

async fn import_projects(db: &DBService, path: &PathBuf, force: bool) -> anyhow::Result<usize> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let projects =
        parse_projects(&raw).with_context(|| format!("parsing {}", path.display()))?;

    let existing = Project::find_all(&db.pool).await?;
    if !existing.is_empty() {
        if !force {
            bail!(
                "{} projects already exist; pass --force to replace them",
                existing.len()
            );
        }
        for project in &existing {
            Project::delete(&db.pool, project.id).await?;
        }
        warn!(count = existing.len(), "Deleted existing projects");
    }

    for (index, project) in projects.iter().enumerate() {
        let mut project = project.clone();
        if project.sort_order == 0 {
            project.sort_order = index as i64;
        }
        let created = Project::create(&db.pool, &project).await?;
        info!(project_id = %created.id, title = %created.title, "Imported project");
    }

    Ok(projects.len())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let Some(args) = parse_args()? else {
        return Ok(());
    };

    let config = ServerConfig::from_env()?;
    let db = DBService::new().await?;

    seed_admin(&db, &config).await?;

    if let Some(path) = &args.projects {
        let count = import_projects(&db, path, args.force).await?;
        info!(count, "Project import finished");
    }

    db.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use db::models::project::ProjectStatus;

    use super::*;

    #[test]
    fn test_bundled_projects_parse() {
        let projects = parse_projects(include_str!("../../../../seed/projects.json")).unwrap();

        assert_eq!(projects.len(), 4);
        assert_eq!(projects[0].client, "UNOPS");
        assert_eq!(projects[0].progress, Some(85));
        assert_eq!(projects[2].status, ProjectStatus::Completed);
        assert!(projects[2].progress.is_none());
        assert!(projects.iter().all(|p| p.published));
    }
}

//! PropDesk application composition root
//!
//! Composes all domain routers into a single application.

use axum::{extract::State, routing::get, Json, Router};
use propdesk_auth::{AuthBackend, AuthConfig};
use propdesk_common::Config;
use propdesk_email::{EmailConfig, EmailService, EmailServiceFactory};
use propdesk_properties::{PropertiesRepositories, PropertiesState};
use propdesk_tasks::{TasksRepositories, TasksState};
use propdesk_team::{TeamRepositories, TeamState};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;

/// Version pair reported to clients
#[derive(Debug, Clone, Serialize)]
pub struct AppVersion {
    pub version: String,
    /// Clients older than this should prompt for an update
    pub min_supported_version: Option<String>,
}

impl From<&Config> for AppVersion {
    fn from(config: &Config) -> Self {
        Self {
            version: config.app_version.clone(),
            min_supported_version: config.min_supported_version.clone(),
        }
    }
}

/// Create the main application router with all routes
pub async fn create_app(config: Config, pool: PgPool) -> Result<Router, anyhow::Error> {
    let email_config = EmailConfig::from_env()?;
    let email_service = EmailServiceFactory::create(email_config).await?;
    Ok(build_router(&config, pool, Arc::from(email_service)))
}

/// Assemble the router around an already-built email service
pub fn build_router(config: &Config, pool: PgPool, email: Arc<dyn EmailService>) -> Router {
    let auth = AuthBackend::new(pool.clone(), AuthConfig::from(config));

    let properties_state = PropertiesState {
        repos: PropertiesRepositories::new(pool.clone()),
        auth: auth.clone(),
    };

    let team_state = TeamState {
        repos: TeamRepositories::new(pool.clone()),
        auth: auth.clone(),
        email,
        invitation_ttl_days: config.invitation_ttl_days,
    };

    let tasks_state = TasksState {
        repos: TasksRepositories::new(pool),
        auth,
    };

    Router::new()
        .route("/health", get(health_check))
        .route(
            "/v1/app/version",
            get(app_version).with_state(AppVersion::from(config)),
        )
        .merge(propdesk_properties::routes().with_state(properties_state))
        .merge(propdesk_team::routes().with_state(team_state))
        .merge(propdesk_tasks::routes().with_state(tasks_state))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// **GET /v1/app/version**
async fn app_version(State(version): State<AppVersion>) -> Json<AppVersion> {
    Json(version)
}

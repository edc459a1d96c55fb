//! Coterie application composition root
//!
//! Composes the organizations domain router with shared infrastructure
//! routes.

use std::sync::Arc;

use axum::Router;
use coterie_email::{EmailConfig, EmailServiceFactory};
use coterie_orgs::{MembershipCoordinator, OrgsRepositories, OrgsState};
use sqlx::PgPool;

/// Embedded sqlx migrations for the service schema
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

/// Create the main application router with all routes and middleware
pub fn create_app(pool: PgPool) -> Result<Router, anyhow::Error> {
    // Create repositories
    let repos = OrgsRepositories::new(pool.clone());

    // Create email service from environment
    let email_config = EmailConfig::from_env()?;
    let email_service: Arc<dyn coterie_email::EmailService> =
        Arc::from(EmailServiceFactory::create(email_config)?);

    // Create the membership coordinator and domain state
    let coordinator = MembershipCoordinator::new(pool, email_service);
    let orgs_state = OrgsState { repos, coordinator };

    // Build router: compose domain routers with shared infrastructure routes
    let app = Router::new()
        .route("/health", axum::routing::get(health_check))
        .route("/", axum::routing::get(|| async { "Coterie API v0.1.0" }))
        .merge(coterie_orgs::routes().with_state(orgs_state));

    Ok(app)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

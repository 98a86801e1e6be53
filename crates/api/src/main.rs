use anyhow::{Context, Result};
use std::net::SocketAddr;
use tracing::{info, warn};

use polling_api::{app, config, middleware, services};
use services::admin_bootstrap::{bootstrap_admin, BootstrapOutcome};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = config::Config::load()?;

    middleware::logging::init_logging(&config.logging);

    info!("Starting Polling API v{}", env!("CARGO_PKG_VERSION"));

    middleware::init_metrics().context("Failed to install Prometheus recorder")?;

    let jwt = services::auth::jwt_from_config(&config.jwt).context("Invalid JWT key material")?;

    let pool = persistence::db::create_pool(&config.database.pool_config()).await?;

    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    match bootstrap_admin(&pool, &config.admin).await? {
        BootstrapOutcome::Created => info!(email = %config.admin.bootstrap_email, "Bootstrap admin created"),
        BootstrapOutcome::AlreadyExists => info!("Bootstrap admin already present"),
        BootstrapOutcome::NotConfigured => warn!("No bootstrap admin configured"),
    }

    let addr = config.socket_addr()?;
    let app = app::create_app(config, pool, jwt);

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

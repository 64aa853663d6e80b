//! Provision the catalog schema: connect, health-check, apply migrations.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yamdb_db::DbConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yamdb_db=debug,yamdb_migrate=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = DbConfig::from_env().context("Invalid database configuration")?;
    tracing::info!(
        max_connections = config.max_connections,
        "Loaded database configuration"
    );

    // --- Database ---
    let pool = yamdb_db::create_pool(&config)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    yamdb_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database health check passed");

    yamdb_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    pool.close().await;
    Ok(())
}

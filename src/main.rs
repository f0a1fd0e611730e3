use anyhow::Context;
use std::sync::Arc;

use procuretrack::config::Config;
use procuretrack::core::telemetry;
use procuretrack::suppliers::SupplierService;
use procuretrack::MySqlStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;

    telemetry::init_tracing(&config.app);

    tracing::info!(
        env = config.app.env.as_str(),
        default_payment_method = %config.app.default_payment_method,
        "Starting procuretrack"
    );

    // Create database connection pool
    let db_pool = config
        .database
        .create_pool()
        .await
        .context("Failed to create database pool")?;

    tracing::info!(
        "Database pool initialized ({} connections)",
        config.database.pool_size
    );

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("Failed to apply migrations")?;

    let store = Arc::new(MySqlStore::new(db_pool.clone()));
    let suppliers = SupplierService::new(store)
        .list_active()
        .await
        .context("Failed to read supplier directory")?;

    tracing::info!(
        active_suppliers = suppliers.len(),
        "Schema up to date, store ready"
    );

    db_pool.close().await;

    Ok(())
}

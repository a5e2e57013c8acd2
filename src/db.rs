use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

use crate::config::AppConfig;

pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("connect to database")?;
    info!(max_connections = config.database_max_connections, "database pool ready");
    Ok(pool)
}

/// Applies `migrations/`; a failure is logged and startup continues.
pub async fn migrate(pool: &PgPool) {
    match sqlx::migrate!("./migrations").run(pool).await {
        Ok(()) => info!("migrations applied"),
        Err(e) => warn!(error = %e, "migration failed; continuing"),
    }
}

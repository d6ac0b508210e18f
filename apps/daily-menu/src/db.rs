use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
///
/// Sized to the per-user concurrency cap plus headroom for the pre-fan-out reads.
pub async fn create_pool(database_url: &str, max_concurrent_users: usize) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let max_connections = u32::try_from(max_concurrent_users)
        .unwrap_or(u32::MAX)
        .saturating_mul(3)
        .saturating_add(2);

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    info!("PostgreSQL connection pool established ({max_connections} max connections)");
    Ok(pool)
}

/// Applies the embedded schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to apply database migrations")?;
    info!("Database migrations applied");
    Ok(())
}

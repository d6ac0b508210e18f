mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod state;
mod store;
mod suggestion;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::llm_client::{GenerativeModel, LlmClient};
use crate::state::JobState;
use crate::store::PgStore;
use crate::suggestion::batch::{run_daily_batch, BatchSettings};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("daily_menu={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting daily-menu v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let pool = create_pool(&config.database_url, config.max_concurrent_users).await?;
    if config.run_migrations {
        run_migrations(&pool).await?;
    }
    let store = Arc::new(PgStore::new(pool));

    // Initialize LLM client
    let llm = LlmClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        config.gemini_base_url.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    )?;
    info!("LLM client initialized (model: {})", llm.model_name());

    let state = JobState {
        users: store.clone(),
        recipes: store.clone(),
        suggestions: store,
        model: Arc::new(llm),
    };
    let settings = BatchSettings::from_config(&config)?;

    let report = run_daily_batch(&state, &settings, Utc::now()).await?;

    info!(
        "Run {} for {} finished with {:?}: {} succeeded, {} failed, {} fallbacks",
        report.run_id,
        report.target_date,
        report.status,
        report.succeeded(),
        report.failed(),
        report.fallbacks()
    );

    Ok(())
}

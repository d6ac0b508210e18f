use anyhow::{bail, Context, Result};
use chrono::FixedOffset;

use crate::llm_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Job configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub llm_timeout_secs: u64,
    /// Offset of the target timezone from UTC. Default +9 (Asia/Tokyo, no DST).
    pub utc_offset_hours: i32,
    /// Users accessed after this hour on the previous local day count as active.
    pub active_cutoff_hour: u32,
    pub max_concurrent_users: usize,
    /// Fixed seed for candidate shuffles; unset means OS entropy.
    pub candidate_seed: Option<u64>,
    pub run_migrations: bool,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            database_url: require_env("DATABASE_URL")?,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_model: optional_env("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_base_url: optional_env("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            utc_offset_hours: parse_env("MENU_UTC_OFFSET_HOURS", 9)?,
            active_cutoff_hour: parse_env("ACTIVE_CUTOFF_HOUR", 4)?,
            max_concurrent_users: parse_env("MAX_CONCURRENT_USERS", 8)?,
            candidate_seed: optional_env("CANDIDATE_SEED")
                .map(|raw| raw.parse::<u64>())
                .transpose()
                .context("CANDIDATE_SEED must be an unsigned integer")?,
            run_migrations: parse_env("RUN_MIGRATIONS", false)?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    /// The configured target timezone as a fixed UTC offset.
    pub fn timezone(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).with_context(|| {
            format!(
                "MENU_UTC_OFFSET_HOURS={} is outside the valid range",
                self.utc_offset_hours
            )
        })
    }

    fn validate(&self) -> Result<()> {
        if self.active_cutoff_hour > 23 {
            bail!(
                "ACTIVE_CUTOFF_HOUR must be between 0 and 23, got {}",
                self.active_cutoff_hour
            );
        }
        if self.max_concurrent_users == 0 {
            bail!("MAX_CONCURRENT_USERS must be at least 1");
        }
        self.timezone()?;
        Ok(())
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config() -> Config {
        Config {
            database_url: "postgres://localhost/menu".to_string(),
            gemini_api_key: "test-key".to_string(),
            gemini_model: DEFAULT_MODEL.to_string(),
            gemini_base_url: DEFAULT_BASE_URL.to_string(),
            llm_timeout_secs: 120,
            utc_offset_hours: 9,
            active_cutoff_hour: 4,
            max_concurrent_users: 8,
            candidate_seed: None,
            run_migrations: false,
            rust_log: "info".to_string(),
        }
    }

    #[test]
    fn test_default_timezone_is_tokyo_offset() {
        let tz = make_config().timezone().unwrap();
        assert_eq!(tz.local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn test_cutoff_hour_out_of_range_rejected() {
        let mut config = make_config();
        config.active_cutoff_hour = 24;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ACTIVE_CUTOFF_HOUR"));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut config = make_config();
        config.max_concurrent_users = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_offset_beyond_a_day_rejected() {
        let mut config = make_config();
        config.utc_offset_hours = 30;
        assert!(config.timezone().is_err());
    }

    #[test]
    fn test_parse_env_falls_back_to_default_when_unset() {
        let value: u64 = parse_env("DAILY_MENU_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}

//! Batch Orchestrator: one daily run over every recently active user.
//!
//! Flow: compute run window → active users → catalog snapshot →
//!       fan out per-user pipelines (bounded) → collect outcomes → report.
//!
//! Per-user failures are logged and recorded; they never abort the run or
//! delay other users. Only failures before fan-out are returned as errors.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::JobError;
use crate::state::JobState;
use crate::suggestion::catalog::CatalogSnapshot;
use crate::suggestion::pipeline::{generate_for_user, UserSuggestion};
use crate::suggestion::reconciler::SuggestionSource;

// ────────────────────────────────────────────────────────────────────────────
// Settings and run window
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct BatchSettings {
    pub timezone: FixedOffset,
    pub cutoff_hour: u32,
    pub max_concurrency: usize,
    pub seed: Option<u64>,
}

impl BatchSettings {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            timezone: config.timezone()?,
            cutoff_hour: config.active_cutoff_hour,
            max_concurrency: config.max_concurrent_users.max(1),
            seed: config.candidate_seed,
        })
    }

    /// RNG for the user at `index` in the active-user list.
    fn rng_for(&self, index: usize) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(index as u64)),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        }
    }
}

/// Lookback boundary and target date for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunWindow {
    /// Users whose last access is strictly after this instant are active.
    pub boundary: DateTime<Utc>,
    /// Today's date in the target timezone.
    pub target_date: NaiveDate,
}

impl RunWindow {
    /// Boundary is the previous local calendar day at `cutoff_hour:00:00`.
    pub fn compute(
        now: DateTime<Utc>,
        tz: FixedOffset,
        cutoff_hour: u32,
    ) -> Result<Self, JobError> {
        let target_date = now.with_timezone(&tz).date_naive();
        let cutoff = NaiveTime::from_hms_opt(cutoff_hour, 0, 0)
            .ok_or_else(|| anyhow!("Invalid cutoff hour {cutoff_hour}"))?;
        let previous_day = target_date
            .pred_opt()
            .ok_or_else(|| anyhow!("No calendar day before {target_date}"))?;
        let boundary = tz
            .from_local_datetime(&previous_day.and_time(cutoff))
            .single()
            .context("Boundary is not a single local instant")?
            .with_timezone(&Utc);

        Ok(Self {
            boundary,
            target_date,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Report
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    NoActiveUsers,
    NoRecipes,
    Completed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserOutcome {
    Succeeded {
        user_id: String,
        selected_recipe_id: String,
        source: SuggestionSource,
    },
    Failed {
        user_id: String,
        error: String,
    },
}

impl UserOutcome {
    pub fn user_id(&self) -> &str {
        match self {
            UserOutcome::Succeeded { user_id, .. } | UserOutcome::Failed { user_id, .. } => user_id,
        }
    }

    fn from_result(user_id: String, result: Result<UserSuggestion, JobError>) -> Self {
        match result {
            Ok(suggestion) => UserOutcome::Succeeded {
                user_id: suggestion.user_id,
                selected_recipe_id: suggestion.record.selected_recipe_id,
                source: suggestion.source,
            },
            Err(e) => UserOutcome::Failed {
                user_id,
                error: e.to_string(),
            },
        }
    }

    /// The one log line per user and run.
    fn log(&self) {
        match self {
            UserOutcome::Succeeded {
                user_id,
                selected_recipe_id,
                source,
            } => info!(
                "Generated for {user_id}: {selected_recipe_id}{}",
                match source {
                    SuggestionSource::Model => "",
                    SuggestionSource::Fallback => " (fallback)",
                }
            ),
            UserOutcome::Failed { user_id, error } => {
                error!(user_id = %user_id, error = %error, "Failed to generate suggestion")
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub target_date: NaiveDate,
    pub status: BatchStatus,
    /// Sorted by user id.
    pub outcomes: Vec<UserOutcome>,
}

impl BatchReport {
    fn empty(run_id: Uuid, target_date: NaiveDate, status: BatchStatus) -> Self {
        Self {
            run_id,
            target_date,
            status,
            outcomes: Vec::new(),
        }
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, UserOutcome::Succeeded { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn fallbacks(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| {
                matches!(
                    o,
                    UserOutcome::Succeeded {
                        source: SuggestionSource::Fallback,
                        ..
                    }
                )
            })
            .count()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestration
// ────────────────────────────────────────────────────────────────────────────

/// Runs the daily batch relative to `now`.
pub async fn run_daily_batch(
    state: &JobState,
    settings: &BatchSettings,
    now: DateTime<Utc>,
) -> Result<BatchReport, JobError> {
    let run_id = Uuid::new_v4();
    let window = RunWindow::compute(now, settings.timezone, settings.cutoff_hour)?;
    let span = info_span!("daily_batch", %run_id, target_date = %window.target_date);

    run_window(state, settings, run_id, window)
        .instrument(span)
        .await
}

async fn run_window(
    state: &JobState,
    settings: &BatchSettings,
    run_id: Uuid,
    window: RunWindow,
) -> Result<BatchReport, JobError> {
    info!(
        "Starting daily suggestions for {} (active since {})",
        window.target_date, window.boundary
    );

    let user_ids = state.users.active_user_ids(window.boundary).await?;
    if user_ids.is_empty() {
        info!("No active users, nothing to do");
        return Ok(BatchReport::empty(
            run_id,
            window.target_date,
            BatchStatus::NoActiveUsers,
        ));
    }
    info!("Found {} active users", user_ids.len());

    let catalog = CatalogSnapshot::load(state.recipes.as_ref()).await?;
    if catalog.is_empty() {
        info!("No recipes in catalog, skipping all users");
        return Ok(BatchReport::empty(
            run_id,
            window.target_date,
            BatchStatus::NoRecipes,
        ));
    }

    let semaphore = Arc::new(Semaphore::new(settings.max_concurrency));
    let mut pending: BTreeSet<String> = BTreeSet::new();
    let mut tasks = JoinSet::new();

    for (index, user_id) in user_ids.into_iter().enumerate() {
        if !pending.insert(user_id.clone()) {
            continue;
        }
        let state = state.clone();
        let catalog = catalog.clone();
        let semaphore = semaphore.clone();
        let mut rng = settings.rng_for(index);
        let date = window.target_date;
        let span = info_span!("user", user_id = %user_id);

        tasks.spawn(
            async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => {
                        generate_for_user(&state, &catalog, &user_id, date, &mut rng).await
                    }
                    Err(e) => Err(JobError::Internal(e.into())),
                };
                let outcome = UserOutcome::from_result(user_id, result);
                outcome.log();
                outcome
            }
            .instrument(span),
        );
    }

    let mut outcomes = Vec::with_capacity(pending.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => {
                pending.remove(outcome.user_id());
                outcomes.push(outcome);
            }
            Err(e) => error!(error = %e, "Per-user task did not complete"),
        }
    }
    // Tasks that panicked never reported their user id.
    for user_id in pending {
        let outcome = UserOutcome::Failed {
            user_id,
            error: "task panicked".to_string(),
        };
        outcome.log();
        outcomes.push(outcome);
    }
    outcomes.sort_by(|a, b| a.user_id().cmp(b.user_id()));

    let report = BatchReport {
        run_id,
        target_date: window.target_date,
        status: BatchStatus::Completed,
        outcomes,
    };
    info!(
        "All suggestions generated: {} succeeded, {} failed, {} fallbacks",
        report.succeeded(),
        report.failed(),
        report.fallbacks()
    );
    Ok(report)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

//! Per-user suggestion pipeline.
//!
//! Flow: load context → select candidates → build prompt → model call →
//!       reconcile → write. Any step's error fails this user only.

use chrono::NaiveDate;
use rand::Rng;
use tracing::debug;

use crate::errors::JobError;
use crate::models::suggestion::SuggestionRecord;
use crate::state::JobState;
use crate::suggestion::candidate_selector::select_candidates;
use crate::suggestion::catalog::CatalogSnapshot;
use crate::suggestion::prompt::build_suggestion_prompt;
use crate::suggestion::reconciler::{reconcile, SuggestionSource};
use crate::suggestion::user_context::load_user_context;
use crate::suggestion::writer::write_suggestion;

/// Outcome of a successful pipeline run for one user.
#[derive(Debug, Clone)]
pub struct UserSuggestion {
    pub user_id: String,
    pub record: SuggestionRecord,
    pub source: SuggestionSource,
}

/// Generates and stores the suggestion for `user_id` on `date`.
///
/// Model output problems are absorbed by the reconciler's fallback; read,
/// model transport and write failures are returned.
pub async fn generate_for_user<R>(
    state: &JobState,
    catalog: &CatalogSnapshot,
    user_id: &str,
    date: NaiveDate,
    rng: &mut R,
) -> Result<UserSuggestion, JobError>
where
    R: Rng + ?Sized,
{
    // Step 1: user context
    let context = load_user_context(state.users.as_ref(), user_id).await?;

    // Step 2: candidates
    let candidates =
        select_candidates(catalog.recipes(), rng).ok_or(JobError::EmptyCatalog)?;
    debug!("Candidates for {user_id}: {:?}", candidates.ids());

    // Step 3: prompt
    let prompt = build_suggestion_prompt(&context, &candidates, date)?;

    // Step 4: model call
    let raw = state.model.generate(&prompt).await?;

    // Step 5: reconcile (never fails)
    let reconciled = reconcile(&raw, &candidates);

    // Step 6: persist
    let record =
        write_suggestion(state.suggestions.as_ref(), user_id, date, &reconciled.result).await?;

    Ok(UserSuggestion {
        user_id: user_id.to_string(),
        record,
        source: reconciled.source,
    })
}

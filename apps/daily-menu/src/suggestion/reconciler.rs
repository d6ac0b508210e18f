//! Response Reconciler: turns raw model text into a `SuggestionResult`.
//!
//! Output that is empty, unparseable, or references recipes outside the
//! candidate set is replaced by a deterministic fallback built from the first
//! candidate. This function never fails.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::llm_client::strip_json_fences;
use crate::models::suggestion::SuggestionResult;
use crate::suggestion::candidate_selector::CandidateSet;

/// Reason stored when the fallback is used.
pub const FALLBACK_REASON: &str = "AI生成に失敗したため、おすすめを選びました。";

/// How many characters of rejected output end up in the log.
const LOGGED_OUTPUT_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionSource {
    Model,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub result: SuggestionResult,
    pub source: SuggestionSource,
}

/// Why model output was rejected.
#[derive(Debug, Error)]
pub enum OutputRejection {
    #[error("model returned no text")]
    Empty,

    #[error("output is not a valid suggestion object: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("output is JSON but not an object")]
    NotAnObject,

    #[error("selectedRecipeId '{0}' is not one of the candidates")]
    UnknownRecipe(String),

    #[error("sideDishRecipeId '{0}' is not one of the candidates")]
    UnknownSideDish(String),
}

/// Shape the model is asked to produce. Text fields may be omitted; wrong types may not.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelSuggestion {
    selected_recipe_id: String,
    #[serde(default)]
    side_dish_recipe_id: Option<String>,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    messie_comment: String,
}

pub fn reconcile(raw: &str, candidates: &CandidateSet<'_>) -> Reconciled {
    match parse_model_output(raw, candidates) {
        Ok(result) => Reconciled {
            result,
            source: SuggestionSource::Model,
        },
        Err(rejection) => {
            warn!(
                "Falling back to first candidate: {rejection}. Output: {:?}",
                raw.chars().take(LOGGED_OUTPUT_CHARS).collect::<String>()
            );
            Reconciled {
                result: fallback_suggestion(candidates),
                source: SuggestionSource::Fallback,
            }
        }
    }
}

/// Strips code fences, parses and validates model output against the candidates.
pub fn parse_model_output(
    raw: &str,
    candidates: &CandidateSet<'_>,
) -> Result<SuggestionResult, OutputRejection> {
    let cleaned = strip_json_fences(raw);
    if cleaned.is_empty() {
        return Err(OutputRejection::Empty);
    }

    // Derived struct deserialization also accepts sequences; only objects are valid.
    let value: Value = serde_json::from_str(cleaned)?;
    if !value.is_object() {
        return Err(OutputRejection::NotAnObject);
    }
    let parsed: ModelSuggestion = serde_json::from_value(value)?;

    if !candidates.contains_id(&parsed.selected_recipe_id) {
        return Err(OutputRejection::UnknownRecipe(parsed.selected_recipe_id));
    }

    // A side dish equal to the main is read as "no side dish".
    let side_dish_recipe_id = parsed
        .side_dish_recipe_id
        .filter(|id| !is_null_like(id) && *id != parsed.selected_recipe_id);
    if let Some(side) = &side_dish_recipe_id {
        if !candidates.contains_id(side) {
            return Err(OutputRejection::UnknownSideDish(side.clone()));
        }
    }

    Ok(SuggestionResult {
        selected_recipe_id: parsed.selected_recipe_id,
        side_dish_recipe_id,
        reason: parsed.reason,
        messie_comment: parsed.messie_comment,
    })
}

/// Deterministic default: the first candidate in selection order, no side dish.
pub fn fallback_suggestion(candidates: &CandidateSet<'_>) -> SuggestionResult {
    let first = candidates.first();
    SuggestionResult {
        selected_recipe_id: first.id.clone(),
        side_dish_recipe_id: None,
        reason: FALLBACK_REASON.to_string(),
        messie_comment: format!("{}がいいと思うっシー！", first.name),
    }
}

// Models sometimes spell "no side dish" as an empty or literal "null" string.
fn is_null_like(id: &str) -> bool {
    let id = id.trim();
    id.is_empty() || id.eq_ignore_ascii_case("null")
}

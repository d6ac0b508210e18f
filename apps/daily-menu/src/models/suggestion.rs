use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The reconciled model answer for one user and day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResult {
    pub selected_recipe_id: String,
    pub side_dish_recipe_id: Option<String>,
    pub reason: String,
    pub messie_comment: String,
}

/// A persisted `daily_suggestions` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SuggestionRecord {
    pub user_id: String,
    pub date: NaiveDate,
    pub selected_recipe_id: String,
    pub side_dish_recipe_id: Option<String>,
    pub reason: String,
    pub messie_comment: String,
    pub created_at: DateTime<Utc>,
}

impl SuggestionRecord {
    #[cfg(test)]
    pub fn result(&self) -> SuggestionResult {
        SuggestionResult {
            selected_recipe_id: self.selected_recipe_id.clone(),
            side_dish_recipe_id: self.side_dish_recipe_id.clone(),
            reason: self.reason.clone(),
            messie_comment: self.messie_comment.clone(),
        }
    }
}

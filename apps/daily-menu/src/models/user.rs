use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const DEFAULT_SERVING_SIZE: u32 = 2;

/// Raw settings columns from the `users` row. Every field may be unset.
#[derive(Debug, Clone, Default, FromRow)]
pub struct UserSettingsRow {
    pub disliked_ingredients: Option<Vec<String>>,
    pub serving_size: Option<i32>,
}

/// Effective per-user settings with defaults applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub disliked_ingredients: Vec<String>,
    pub serving_size: u32,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            disliked_ingredients: Vec::new(),
            serving_size: DEFAULT_SERVING_SIZE,
        }
    }
}

impl UserSettings {
    /// Applies defaults for a missing row or missing / non-positive fields.
    pub fn from_row(row: Option<UserSettingsRow>) -> Self {
        let Some(row) = row else {
            return Self::default();
        };
        Self {
            disliked_ingredients: row.disliked_ingredients.unwrap_or_default(),
            serving_size: row
                .serving_size
                .and_then(|n| u32::try_from(n).ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_SERVING_SIZE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct MealRecordRow {
    pub recipe_name: String,
    pub meal_type: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct PantryItemRow {
    pub ingredient_name: String,
    pub estimated_amount: String,
}

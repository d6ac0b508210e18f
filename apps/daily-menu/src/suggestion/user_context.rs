//! User Context Loader: settings, recent meals and pantry for one user,
//! rendered into the display strings the prompt embeds.

use crate::errors::JobError;
use crate::models::user::{MealRecordRow, PantryItemRow, UserSettings};
use crate::store::UserStore;

/// How many past meals are shown to the model.
pub const RECENT_MEAL_LIMIT: i64 = 10;
/// Placeholder for an empty list.
pub const NONE_PLACEHOLDER: &str = "なし";
/// Placeholder when nothing is known to be in the pantry.
pub const UNKNOWN_PLACEHOLDER: &str = "不明";
/// Pantry amount meaning "used up"; such items are hidden from the model.
pub const PANTRY_EMPTY_AMOUNT: &str = "なし";

const LIST_SEPARATOR: &str = ", ";

#[derive(Debug, Clone, PartialEq)]
pub struct UserContext {
    pub settings: UserSettings,
    pub recent_meals: String,
    pub pantry: String,
}

impl UserContext {
    pub fn disliked_ingredients(&self) -> String {
        render_disliked(&self.settings.disliked_ingredients)
    }
}

/// Loads and renders the context for `user_id`. The three reads run concurrently;
/// the first failure fails the whole load.
pub async fn load_user_context(
    store: &dyn UserStore,
    user_id: &str,
) -> Result<UserContext, JobError> {
    let (settings, meals, pantry) = tokio::try_join!(
        store.user_settings(user_id),
        store.recent_meals(user_id, RECENT_MEAL_LIMIT),
        store.pantry_items(user_id),
    )?;

    Ok(UserContext {
        settings: UserSettings::from_row(settings),
        recent_meals: render_recent_meals(&meals),
        pantry: render_pantry(&pantry),
    })
}

pub fn render_recent_meals(meals: &[MealRecordRow]) -> String {
    if meals.is_empty() {
        return NONE_PLACEHOLDER.to_string();
    }
    meals
        .iter()
        .map(|m| format!("{} ({})", m.recipe_name, m.meal_type))
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}

pub fn render_pantry(items: &[PantryItemRow]) -> String {
    let present: Vec<String> = items
        .iter()
        .filter(|item| item.estimated_amount.trim() != PANTRY_EMPTY_AMOUNT)
        .map(|item| format!("{}({})", item.ingredient_name, item.estimated_amount))
        .collect();

    if present.is_empty() {
        UNKNOWN_PLACEHOLDER.to_string()
    } else {
        present.join(LIST_SEPARATOR)
    }
}

pub fn render_disliked(disliked: &[String]) -> String {
    if disliked.is_empty() {
        NONE_PLACEHOLDER.to_string()
    } else {
        disliked.join(LIST_SEPARATOR)
    }
}

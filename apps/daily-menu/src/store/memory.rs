use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::errors::JobError;
use crate::models::recipe::Recipe;
use crate::models::suggestion::{SuggestionRecord, SuggestionResult};
use crate::models::user::{MealRecordRow, PantryItemRow, UserSettingsRow};
use crate::store::{RecipeStore, SuggestionStore, UserStore};

#[derive(Debug, Clone)]
struct MemoryUser {
    last_access_at: DateTime<Utc>,
    settings: Option<UserSettingsRow>,
    meals: Vec<MealRecordRow>,
    pantry: Vec<PantryItemRow>,
}

#[derive(Default)]
struct Inner {
    users: BTreeMap<String, MemoryUser>,
    recipes: Vec<Recipe>,
    suggestions: BTreeMap<(String, NaiveDate), SuggestionRecord>,
    failing_reads: HashSet<String>,
    failing_writes: HashSet<String>,
    recipe_reads: usize,
    writes: usize,
}

/// In-memory implementation of every store seam, with failure injection.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user_id: &str, last_access_at: DateTime<Utc>) {
        self.inner.lock().unwrap().users.insert(
            user_id.to_string(),
            MemoryUser {
                last_access_at,
                settings: None,
                meals: Vec::new(),
                pantry: Vec::new(),
            },
        );
    }

    pub fn set_settings(&self, user_id: &str, settings: UserSettingsRow) {
        if let Some(user) = self.inner.lock().unwrap().users.get_mut(user_id) {
            user.settings = Some(settings);
        }
    }

    pub fn add_meal(&self, user_id: &str, recipe_name: &str, meal_type: &str, date: NaiveDate) {
        if let Some(user) = self.inner.lock().unwrap().users.get_mut(user_id) {
            user.meals.push(MealRecordRow {
                recipe_name: recipe_name.to_string(),
                meal_type: meal_type.to_string(),
                date,
            });
        }
    }

    pub fn add_pantry_item(&self, user_id: &str, ingredient_name: &str, estimated_amount: &str) {
        if let Some(user) = self.inner.lock().unwrap().users.get_mut(user_id) {
            user.pantry.push(PantryItemRow {
                ingredient_name: ingredient_name.to_string(),
                estimated_amount: estimated_amount.to_string(),
            });
        }
    }

    pub fn set_recipes(&self, recipes: Vec<Recipe>) {
        self.inner.lock().unwrap().recipes = recipes;
    }

    /// Every per-user read for `user_id` fails from now on.
    pub fn fail_reads_for(&self, user_id: &str) {
        self.inner
            .lock()
            .unwrap()
            .failing_reads
            .insert(user_id.to_string());
    }

    pub fn fail_writes_for(&self, user_id: &str) {
        self.inner
            .lock()
            .unwrap()
            .failing_writes
            .insert(user_id.to_string());
    }

    pub fn suggestion(&self, user_id: &str, date: NaiveDate) -> Option<SuggestionRecord> {
        self.inner
            .lock()
            .unwrap()
            .suggestions
            .get(&(user_id.to_string(), date))
            .cloned()
    }

    pub fn suggestion_count(&self) -> usize {
        self.inner.lock().unwrap().suggestions.len()
    }

    pub fn recipe_reads(&self) -> usize {
        self.inner.lock().unwrap().recipe_reads
    }

    pub fn writes(&self) -> usize {
        self.inner.lock().unwrap().writes
    }

    fn read_user<T>(
        &self,
        user_id: &str,
        read: impl FnOnce(Option<&MemoryUser>) -> T,
    ) -> Result<T, JobError> {
        let inner = self.inner.lock().unwrap();
        if inner.failing_reads.contains(user_id) {
            return Err(JobError::Database(sqlx::Error::Protocol(format!(
                "injected read failure for {user_id}"
            ))));
        }
        Ok(read(inner.users.get(user_id)))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn active_user_ids(&self, since: DateTime<Utc>) -> Result<Vec<String>, JobError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .iter()
            .filter(|(_, user)| user.last_access_at > since)
            .map(|(id, _)| id.clone())
            .collect())
    }

    async fn user_settings(&self, user_id: &str) -> Result<Option<UserSettingsRow>, JobError> {
        self.read_user(user_id, |user| user.and_then(|u| u.settings.clone()))
    }

    async fn recent_meals(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<MealRecordRow>, JobError> {
        self.read_user(user_id, |user| {
            let mut meals = user.map(|u| u.meals.clone()).unwrap_or_default();
            meals.sort_by(|a, b| b.date.cmp(&a.date));
            meals.truncate(usize::try_from(limit).unwrap_or(0));
            meals
        })
    }

    async fn pantry_items(&self, user_id: &str) -> Result<Vec<PantryItemRow>, JobError> {
        self.read_user(user_id, |user| user.map(|u| u.pantry.clone()).unwrap_or_default())
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn all_recipes(&self) -> Result<Vec<Recipe>, JobError> {
        let mut inner = self.inner.lock().unwrap();
        inner.recipe_reads += 1;
        Ok(inner.recipes.clone())
    }
}

#[async_trait]
impl SuggestionStore for MemoryStore {
    async fn upsert_suggestion(
        &self,
        user_id: &str,
        date: NaiveDate,
        result: &SuggestionResult,
    ) -> Result<SuggestionRecord, JobError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.failing_writes.contains(user_id) {
            return Err(JobError::Database(sqlx::Error::Protocol(format!(
                "injected write failure for {user_id}"
            ))));
        }
        let record = SuggestionRecord {
            user_id: user_id.to_string(),
            date,
            selected_recipe_id: result.selected_recipe_id.clone(),
            side_dish_recipe_id: result.side_dish_recipe_id.clone(),
            reason: result.reason.clone(),
            messie_comment: result.messie_comment.clone(),
            created_at: Utc::now(),
        };
        inner.writes += 1;
        inner
            .suggestions
            .insert((user_id.to_string(), date), record.clone());
        Ok(record)
    }
}

//! Persistence seams for the job.
//!
//! The pipeline only sees these traits. `PgStore` is the production backend;
//! tests drive the same code through `memory::MemoryStore`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::errors::JobError;
use crate::models::recipe::Recipe;
use crate::models::suggestion::{SuggestionRecord, SuggestionResult};
use crate::models::user::{MealRecordRow, PantryItemRow, UserSettingsRow};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

/// Reads over users and their per-user collections.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Ids of users whose last access is strictly after `since`.
    async fn active_user_ids(&self, since: DateTime<Utc>) -> Result<Vec<String>, JobError>;

    /// `None` when the user has no stored settings.
    async fn user_settings(&self, user_id: &str) -> Result<Option<UserSettingsRow>, JobError>;

    /// Most recent meals first, at most `limit` rows.
    async fn recent_meals(&self, user_id: &str, limit: i64)
        -> Result<Vec<MealRecordRow>, JobError>;

    async fn pantry_items(&self, user_id: &str) -> Result<Vec<PantryItemRow>, JobError>;
}

#[async_trait]
pub trait RecipeStore: Send + Sync {
    async fn all_recipes(&self) -> Result<Vec<Recipe>, JobError>;
}

#[async_trait]
pub trait SuggestionStore: Send + Sync {
    /// Inserts or replaces the record for (user, date). The store assigns `created_at`.
    async fn upsert_suggestion(
        &self,
        user_id: &str,
        date: NaiveDate,
        result: &SuggestionResult,
    ) -> Result<SuggestionRecord, JobError>;
}

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::errors::JobError;
use crate::models::recipe::{Recipe, RecipeRow};
use crate::models::suggestion::{SuggestionRecord, SuggestionResult};
use crate::models::user::{MealRecordRow, PantryItemRow, UserSettingsRow};
use crate::store::{RecipeStore, SuggestionStore, UserStore};

/// PostgreSQL backend for every store seam.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn active_user_ids(&self, since: DateTime<Utc>) -> Result<Vec<String>, JobError> {
        let ids: Vec<String> =
            sqlx::query_scalar("SELECT id FROM users WHERE last_access_at > $1 ORDER BY id")
                .bind(since)
                .fetch_all(&self.pool)
                .await?;
        Ok(ids)
    }

    async fn user_settings(&self, user_id: &str) -> Result<Option<UserSettingsRow>, JobError> {
        let row: Option<UserSettingsRow> = sqlx::query_as(
            "SELECT disliked_ingredients, serving_size FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn recent_meals(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<MealRecordRow>, JobError> {
        let rows: Vec<MealRecordRow> = sqlx::query_as(
            r#"
            SELECT recipe_name, meal_type, date
            FROM meal_records
            WHERE user_id = $1
            ORDER BY date DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn pantry_items(&self, user_id: &str) -> Result<Vec<PantryItemRow>, JobError> {
        let rows: Vec<PantryItemRow> = sqlx::query_as(
            "SELECT ingredient_name, estimated_amount FROM pantry_items WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl RecipeStore for PgStore {
    async fn all_recipes(&self) -> Result<Vec<Recipe>, JobError> {
        let rows: Vec<RecipeRow> = sqlx::query_as(
            r#"
            SELECT id, name, category, cuisine, time_minutes, ingredients, tags
            FROM recipes
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Recipe::from).collect())
    }
}

#[async_trait]
impl SuggestionStore for PgStore {
    async fn upsert_suggestion(
        &self,
        user_id: &str,
        date: NaiveDate,
        result: &SuggestionResult,
    ) -> Result<SuggestionRecord, JobError> {
        // Overwrite, never append: one row per (user, date).
        let record: SuggestionRecord = sqlx::query_as(
            r#"
            INSERT INTO daily_suggestions
                (user_id, date, selected_recipe_id, side_dish_recipe_id, reason, messie_comment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, now())
            ON CONFLICT (user_id, date) DO UPDATE SET
                selected_recipe_id = EXCLUDED.selected_recipe_id,
                side_dish_recipe_id = EXCLUDED.side_dish_recipe_id,
                reason = EXCLUDED.reason,
                messie_comment = EXCLUDED.messie_comment,
                created_at = EXCLUDED.created_at
            RETURNING user_id, date, selected_recipe_id, side_dish_recipe_id, reason, messie_comment, created_at
            "#,
        )
        .bind(user_id)
        .bind(date)
        .bind(&result.selected_recipe_id)
        .bind(&result.side_dish_recipe_id)
        .bind(&result.reason)
        .bind(&result.messie_comment)
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }
}

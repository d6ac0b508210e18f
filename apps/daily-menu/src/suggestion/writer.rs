use chrono::NaiveDate;
use tracing::debug;

use crate::errors::JobError;
use crate::models::suggestion::{SuggestionRecord, SuggestionResult};
use crate::store::SuggestionStore;

/// Persists the suggestion for (user, date), replacing any earlier record for that key.
pub async fn write_suggestion(
    store: &dyn SuggestionStore,
    user_id: &str,
    date: NaiveDate,
    result: &SuggestionResult,
) -> Result<SuggestionRecord, JobError> {
    let record = store.upsert_suggestion(user_id, date, result).await?;
    debug!(
        "Stored suggestion {} for {} on {}",
        record.selected_recipe_id, record.user_id, record.date
    );
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    fn make_result(id: &str) -> SuggestionResult {
        SuggestionResult {
            selected_recipe_id: id.to_string(),
            side_dish_recipe_id: Some("side-0".to_string()),
            reason: "理由".to_string(),
            messie_comment: "いいっシー".to_string(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 16).unwrap()
    }

    #[tokio::test]
    async fn test_write_returns_stored_record() {
        let store = MemoryStore::new();

        let record = write_suggestion(&store, "u1", date(), &make_result("main-1"))
            .await
            .unwrap();

        assert_eq!(record.user_id, "u1");
        assert_eq!(record.date, date());
        assert_eq!(record.result(), make_result("main-1"));
    }

    #[tokio::test]
    async fn test_second_write_replaces_first() {
        let store = MemoryStore::new();

        write_suggestion(&store, "u1", date(), &make_result("main-1")).await.unwrap();
        write_suggestion(&store, "u1", date(), &make_result("main-2")).await.unwrap();

        assert_eq!(store.suggestion_count(), 1, "One record per (user, date)");
        let stored = store.suggestion("u1", date()).unwrap();
        assert_eq!(stored.selected_recipe_id, "main-2");
    }

    #[tokio::test]
    async fn test_write_failure_propagates() {
        let store = MemoryStore::new();
        store.fail_writes_for("u1");

        let result = write_suggestion(&store, "u1", date(), &make_result("main-1")).await;

        assert!(matches!(result, Err(JobError::Database(_))));
        assert!(store.suggestion("u1", date()).is_none());
    }
}

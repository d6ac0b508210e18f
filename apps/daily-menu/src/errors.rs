use thiserror::Error;

use crate::llm_client::LlmError;

/// Job-level error type.
/// Per-user pipelines return it; the orchestrator logs it and moves on.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Recipe catalog is empty")]
    EmptyCatalog,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_error_converts_with_message() {
        let err: JobError = LlmError::Api {
            status: 503,
            message: "overloaded".to_string(),
        }
        .into();
        assert!(matches!(err, JobError::Llm(_)));
        assert!(err.to_string().contains("overloaded"));
    }

    #[test]
    fn test_database_error_converts_with_message() {
        let err: JobError = sqlx::Error::Protocol("pantry read failed".to_string()).into();
        assert!(matches!(err, JobError::Database(_)));
        assert!(err.to_string().starts_with("Database error:"));
        assert!(err.to_string().contains("pantry read failed"));
    }
}

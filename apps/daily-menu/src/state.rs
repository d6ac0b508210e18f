use std::sync::Arc;

use crate::llm_client::GenerativeModel;
use crate::store::{RecipeStore, SuggestionStore, UserStore};

/// Shared job state handed to the batch orchestrator and cloned into every per-user task.
#[derive(Clone)]
pub struct JobState {
    pub users: Arc<dyn UserStore>,
    pub recipes: Arc<dyn RecipeStore>,
    pub suggestions: Arc<dyn SuggestionStore>,
    /// Production: `LlmClient`. Tests swap in a scripted double.
    pub model: Arc<dyn GenerativeModel>,
}

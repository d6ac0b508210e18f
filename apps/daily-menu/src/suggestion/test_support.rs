//! Shared fixtures for the suggestion tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::llm_client::{GenerativeModel, LlmError};
use crate::models::recipe::{Recipe, RecipeCategory};
use crate::state::JobState;
use crate::store::memory::MemoryStore;

pub fn make_recipe(id: &str, category: &str) -> Recipe {
    Recipe {
        id: id.to_string(),
        name: format!("料理 {id}"),
        category: RecipeCategory::parse(category),
        cuisine: "japanese".to_string(),
        time_minutes: 20,
        ingredients: vec!["卵".to_string(), "ねぎ".to_string()],
        tags: vec!["簡単".to_string()],
    }
}

/// Builds a catalog with ids `{category}-{i}`, in the order given.
pub fn make_catalog(shape: &[(&str, usize)]) -> Vec<Recipe> {
    shape
        .iter()
        .flat_map(|(category, count)| {
            (0..*count).map(move |i| make_recipe(&format!("{category}-{i}"), category))
        })
        .collect()
}

#[derive(Debug, Clone)]
enum Script {
    Reply(String),
    /// Replies `{"selectedRecipeId": <first candidate id in the prompt>}`.
    PickFirstCandidate,
    Fail { status: u16 },
}

/// Generative model double that answers from a script and records every prompt.
pub struct ScriptedModel {
    script: Script,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn replying(text: &str) -> Self {
        Self::with_script(Script::Reply(text.to_string()))
    }

    pub fn picking_first_candidate() -> Self {
        Self::with_script(Script::PickFirstCandidate)
    }

    pub fn failing(status: u16) -> Self {
        Self::with_script(Script::Fail { status })
    }

    fn with_script(script: Script) -> Self {
        Self {
            script,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.script {
            Script::Reply(text) => Ok(text.clone()),
            Script::PickFirstCandidate => {
                let id = first_candidate_id(prompt).unwrap_or_default();
                Ok(serde_json::json!({
                    "selectedRecipeId": id,
                    "sideDishRecipeId": null,
                    "reason": "テスト",
                    "messieComment": "テストっシー"
                })
                .to_string())
            }
            Script::Fail { status } => Err(LlmError::Api {
                status: *status,
                message: "scripted failure".to_string(),
            }),
        }
    }
}

fn first_candidate_id(prompt: &str) -> Option<String> {
    let rest = prompt.split("\"id\":\"").nth(1)?;
    rest.split('"').next().map(str::to_string)
}

/// State whose three store seams all point at `store`.
pub fn make_state(store: Arc<MemoryStore>, model: Arc<dyn GenerativeModel>) -> JobState {
    JobState {
        users: store.clone(),
        recipes: store.clone(),
        suggestions: store,
        model,
    }
}

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::JobError;
use crate::models::recipe::Recipe;
use crate::store::RecipeStore;

/// Read-only view of the recipe catalog for one run.
///
/// Loaded once before fan-out and shared by every per-user task.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    recipes: Arc<[Recipe]>,
}

impl CatalogSnapshot {
    /// Builds a snapshot, dropping recipes whose id was already seen (first wins).
    pub fn new(recipes: Vec<Recipe>) -> Self {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(recipes.len());
        for recipe in recipes {
            if seen.insert(recipe.id.clone()) {
                unique.push(recipe);
            } else {
                warn!("Dropping recipe with duplicate id '{}'", recipe.id);
            }
        }
        Self {
            recipes: unique.into(),
        }
    }

    pub async fn load(store: &dyn RecipeStore) -> Result<Self, JobError> {
        let snapshot = Self::new(store.all_recipes().await?);
        info!("Loaded recipe catalog with {} recipes", snapshot.len());
        Ok(snapshot)
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

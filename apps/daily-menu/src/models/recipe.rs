use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Recipe category tag as stored in the catalog.
///
/// Unknown tags are kept verbatim in `Other` so they round-trip into prompts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecipeCategory {
    Main,
    Rice,
    Noodle,
    Side,
    Soup,
    Other(String),
}

/// Coarse grouping used to balance candidate composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryGroup {
    MainLike,
    SideLike,
    Other,
}

impl RecipeCategory {
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "main" => RecipeCategory::Main,
            "rice" => RecipeCategory::Rice,
            "noodle" => RecipeCategory::Noodle,
            "side" => RecipeCategory::Side,
            "soup" => RecipeCategory::Soup,
            _ => RecipeCategory::Other(tag.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RecipeCategory::Main => "main",
            RecipeCategory::Rice => "rice",
            RecipeCategory::Noodle => "noodle",
            RecipeCategory::Side => "side",
            RecipeCategory::Soup => "soup",
            RecipeCategory::Other(tag) => tag,
        }
    }

    pub fn group(&self) -> CategoryGroup {
        match self {
            RecipeCategory::Main | RecipeCategory::Rice | RecipeCategory::Noodle => {
                CategoryGroup::MainLike
            }
            RecipeCategory::Side | RecipeCategory::Soup => CategoryGroup::SideLike,
            RecipeCategory::Other(_) => CategoryGroup::Other,
        }
    }
}

impl From<String> for RecipeCategory {
    fn from(tag: String) -> Self {
        RecipeCategory::parse(&tag)
    }
}

impl From<RecipeCategory> for String {
    fn from(category: RecipeCategory) -> Self {
        category.as_str().to_string()
    }
}

/// A catalog recipe. Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub category: RecipeCategory,
    pub cuisine: String,
    pub time_minutes: u32,
    pub ingredients: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct RecipeRow {
    pub id: String,
    pub name: String,
    pub category: String,
    pub cuisine: String,
    pub time_minutes: i32,
    pub ingredients: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
}

impl From<RecipeRow> for Recipe {
    fn from(row: RecipeRow) -> Self {
        Recipe {
            id: row.id,
            name: row.name,
            category: RecipeCategory::parse(&row.category),
            cuisine: row.cuisine,
            time_minutes: u32::try_from(row.time_minutes).unwrap_or(0),
            ingredients: row.ingredients.unwrap_or_default(),
            tags: row.tags.unwrap_or_default(),
        }
    }
}

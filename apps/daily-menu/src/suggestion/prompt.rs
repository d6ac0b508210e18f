//! Prompt Builder: renders the daily suggestion prompt.
//!
//! Pure: the same context, candidates and date always give the same text.

use chrono::NaiveDate;
use serde::Serialize;

use crate::errors::JobError;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::models::recipe::Recipe;
use crate::suggestion::candidate_selector::CandidateSet;
use crate::suggestion::user_context::UserContext;

/// Persona preamble. Every sentence the model writes ends in 「〜っシー」.
pub const PERSONA_PREAMBLE: &str = "\
あなたは献立提案アシスタント「メッシー」です。
小型恐竜のキャラで、有能・実用的・ちょっとドライな性格です。
語尾は必ず「〜っシー」にしてください。";

pub const TASK_INSTRUCTIONS: &str = "\
1. 上記のレシピ候補から最適な「主菜（Main）」を1品選んでください
2. その主菜に合う「副菜（Side/Soup）」があれば1品選んでください（なければnull）
3. 選定理由を簡潔に
4. メッシーとしての一言コメント";

/// Exact output object the reconciler expects.
pub const OUTPUT_FORMAT: &str = r#"{
  "selectedRecipeId": "主菜のレシピID",
  "sideDishRecipeId": "副菜のレシピID（またはnull）",
  "reason": "選定理由",
  "messieComment": "コメント"
}"#;

/// What the model sees of each candidate.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CandidateView<'a> {
    id: &'a str,
    name: &'a str,
    ingredients: &'a [String],
    category: &'a str,
    cuisine: &'a str,
    time_minutes: u32,
    tags: &'a [String],
}

impl<'a> From<&'a Recipe> for CandidateView<'a> {
    fn from(recipe: &'a Recipe) -> Self {
        CandidateView {
            id: &recipe.id,
            name: &recipe.name,
            ingredients: &recipe.ingredients,
            category: recipe.category.as_str(),
            cuisine: &recipe.cuisine,
            time_minutes: recipe.time_minutes,
            tags: &recipe.tags,
        }
    }
}

pub fn candidates_json(candidates: &CandidateSet<'_>) -> Result<String, JobError> {
    let views: Vec<CandidateView<'_>> = candidates
        .recipes()
        .iter()
        .map(|r| CandidateView::from(*r))
        .collect();
    serde_json::to_string(&views)
        .map_err(|e| JobError::Internal(anyhow::anyhow!("Failed to serialize candidates: {e}")))
}

/// Builds the full prompt for one user and day.
pub fn build_suggestion_prompt(
    context: &UserContext,
    candidates: &CandidateSet<'_>,
    date: NaiveDate,
) -> Result<String, JobError> {
    let candidates_json = candidates_json(candidates)?;

    Ok(format!(
        "{PERSONA_PREAMBLE}

## ユーザー情報
- 最近の食事履歴: {recent_meals}
- 苦手な食材: {disliked}
- 冷蔵庫にありそうなもの: {pantry}
- 人数: {serving_size}人分
- 今日の曜日: {weekday}
- 日付: {date}

## レシピ候補（JSON）
{candidates_json}

## タスク
{TASK_INSTRUCTIONS}

## 出力形式（JSON）
{OUTPUT_FORMAT}

{JSON_ONLY_INSTRUCTION}
",
        recent_meals = context.recent_meals,
        disliked = context.disliked_ingredients(),
        pantry = context.pantry,
        serving_size = context.settings.serving_size,
        weekday = date.format("%A"),
        date = date.format("%Y-%m-%d"),
    ))
}

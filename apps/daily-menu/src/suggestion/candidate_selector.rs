//! Candidate Selector: picks the bounded pool of recipes offered to the model.
//!
//! Composition is fixed (up to 6 main-like then up to 4 side-like), content is
//! random. The random source is passed in so runs can be reproduced.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::recipe::{CategoryGroup, Recipe};

// ────────────────────────────────────────────────────────────────────────────
// Limits
// ────────────────────────────────────────────────────────────────────────────

pub const MAIN_LIMIT: usize = 6;
pub const SIDE_LIMIT: usize = 4;
/// Below this many picks the set is topped up from the rest of the catalog.
pub const MIN_CANDIDATES: usize = 5;
/// Top-up target.
pub const TARGET_CANDIDATES: usize = 10;

// ────────────────────────────────────────────────────────────────────────────
// Candidate set
// ────────────────────────────────────────────────────────────────────────────

/// Non-empty, duplicate-free list of catalog recipes, in selection order.
#[derive(Debug, Clone)]
pub struct CandidateSet<'a> {
    recipes: Vec<&'a Recipe>,
}

impl<'a> CandidateSet<'a> {
    /// The first recipe in selection order. Always present.
    pub fn first(&self) -> &'a Recipe {
        self.recipes[0]
    }

    pub fn recipes(&self) -> &[&'a Recipe] {
        &self.recipes
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.recipes.iter().any(|r| r.id == id)
    }

    pub fn ids(&self) -> Vec<&'a str> {
        self.recipes.iter().map(|r| r.id.as_str()).collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Selection algorithm
// ────────────────────────────────────────────────────────────────────────────

/// Selects candidates from `catalog`. Returns `None` only for an empty catalog.
///
/// Algorithm:
/// 1. Partition into main-like and side-like groups, keeping catalog order
/// 2. Shuffle each group independently
/// 3. Take up to MAIN_LIMIT main-like, then up to SIDE_LIMIT side-like
/// 4. If fewer than MIN_CANDIDATES, append shuffled leftovers up to TARGET_CANDIDATES
pub fn select_candidates<'a, R>(catalog: &'a [Recipe], rng: &mut R) -> Option<CandidateSet<'a>>
where
    R: Rng + ?Sized,
{
    if catalog.is_empty() {
        return None;
    }

    let mut mains = group(catalog, CategoryGroup::MainLike);
    let mut sides = group(catalog, CategoryGroup::SideLike);
    mains.shuffle(rng);
    sides.shuffle(rng);

    let mut seen: HashSet<&str> = HashSet::new();
    let mut selected: Vec<&Recipe> = Vec::with_capacity(TARGET_CANDIDATES);

    for recipe in mains.into_iter().take(MAIN_LIMIT) {
        if seen.insert(recipe.id.as_str()) {
            selected.push(recipe);
        }
    }
    for recipe in sides.into_iter().take(SIDE_LIMIT) {
        if seen.insert(recipe.id.as_str()) {
            selected.push(recipe);
        }
    }

    if selected.len() < MIN_CANDIDATES {
        let mut remaining: Vec<&Recipe> = catalog
            .iter()
            .filter(|r| !seen.contains(r.id.as_str()))
            .collect();
        remaining.shuffle(rng);

        for recipe in remaining {
            if selected.len() >= TARGET_CANDIDATES {
                break;
            }
            if seen.insert(recipe.id.as_str()) {
                selected.push(recipe);
            }
        }
    }

    Some(CandidateSet { recipes: selected })
}

fn group(catalog: &[Recipe], wanted: CategoryGroup) -> Vec<&Recipe> {
    catalog
        .iter()
        .filter(|r| r.category.group() == wanted)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

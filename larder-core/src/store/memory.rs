//! In-memory recipe store.
//!
//! Evaluates queries with [`crate::query::evaluate`], which is the
//! reference behaviour other backends are tested against. A store can be
//! switched into a failing mode to exercise error handling.

use super::RecipeStore;
use crate::error::StoreError;
use crate::query::{evaluate, RecipePage, RecipeQuery};
use crate::types::{NewReview, Recipe, Review};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryStore {
    recipes: RwLock<BTreeMap<String, Recipe>>,
    reviews: RwLock<Vec<Review>>,
    /// When set, every call fails with this error
    failure: RwLock<Option<StoreError>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recipes(recipes: impl IntoIterator<Item = Recipe>) -> Self {
        let store = Self::new();
        for recipe in recipes {
            store.insert(recipe);
        }
        store
    }

    /// Insert or replace a recipe, keyed by id.
    pub fn insert(&self, recipe: Recipe) {
        write(&self.recipes).insert(recipe.id.clone(), recipe);
    }

    pub fn len(&self) -> usize {
        read(&self.recipes).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make every subsequent call fail with a connection error.
    pub fn fail_with(&self, message: &str) {
        *write(&self.failure) = Some(StoreError::Connection(message.to_string()));
    }

    /// Make every subsequent call fail as if it ran past `timeout`.
    pub fn fail_with_timeout(&self, timeout: Duration) {
        *write(&self.failure) = Some(StoreError::Timeout(timeout));
    }

    pub fn recover(&self) {
        *write(&self.failure) = None;
    }

    fn check(&self) -> Result<(), StoreError> {
        match read(&self.failure).as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

// A poisoned lock only means another test thread panicked mid-write; the
// map itself is still usable.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn find_recipes(&self, query: &RecipeQuery) -> Result<RecipePage, StoreError> {
        self.check()?;
        let recipes = read(&self.recipes);
        Ok(evaluate(recipes.values(), query))
    }

    async fn get_recipe(&self, id: &str) -> Result<Option<Recipe>, StoreError> {
        self.check()?;
        Ok(read(&self.recipes).get(id).cloned())
    }

    async fn get_recipes(&self, ids: &[String]) -> Result<Vec<Recipe>, StoreError> {
        self.check()?;
        let recipes = read(&self.recipes);
        Ok(ids.iter().filter_map(|id| recipes.get(id).cloned()).collect())
    }

    async fn update_description(
        &self,
        id: &str,
        description: Option<&str>,
    ) -> Result<Option<Recipe>, StoreError> {
        self.check()?;
        let mut recipes = write(&self.recipes);
        Ok(recipes.get_mut(id).map(|recipe| {
            recipe.description = description.map(str::to_string);
            recipe.clone()
        }))
    }

    async fn categories(&self) -> Result<Vec<String>, StoreError> {
        self.check()?;
        let categories: BTreeSet<String> = read(&self.recipes)
            .values()
            .filter(|r| !r.category.is_empty())
            .map(|r| r.category.clone())
            .collect();
        Ok(categories.into_iter().collect())
    }

    async fn tags(&self) -> Result<Vec<String>, StoreError> {
        self.check()?;
        let tags: BTreeSet<String> = read(&self.recipes)
            .values()
            .flat_map(|r| r.tags.iter().cloned())
            .collect();
        Ok(tags.into_iter().collect())
    }

    async fn reviews(&self, recipe_id: &str) -> Result<Vec<Review>, StoreError> {
        self.check()?;
        let mut reviews: Vec<Review> = read(&self.reviews)
            .iter()
            .filter(|r| r.recipe_id == recipe_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(reviews)
    }

    async fn add_review(
        &self,
        recipe_id: &str,
        review: &NewReview,
    ) -> Result<Option<Review>, StoreError> {
        self.check()?;
        if !read(&self.recipes).contains_key(recipe_id) {
            return Ok(None);
        }

        let stored = Review {
            id: Uuid::new_v4(),
            recipe_id: recipe_id.to_string(),
            author: review.author.clone(),
            rating: review.rating,
            comment: review.comment.clone(),
            created_at: Utc::now(),
        };
        write(&self.reviews).push(stored.clone());
        Ok(Some(stored))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

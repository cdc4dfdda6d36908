//! Storage abstraction for recipes and reviews.
//!
//! The HTTP layer only talks to [`RecipeStore`]. The server binary uses a
//! PostgreSQL implementation; [`MemoryStore`] backs tests and local demos.

mod memory;

pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::query::{RecipePage, RecipeQuery};
use crate::types::{NewReview, Recipe, Review};
use async_trait::async_trait;
use std::fmt;

/// Trait for recipe store backends.
///
/// Implementations are shared between concurrent requests and hold no
/// per-request state. A failed call is reported immediately; retrying is
/// left to the backend's client library.
#[async_trait]
pub trait RecipeStore: Send + Sync + fmt::Debug {
    /// Filter, order and paginate the recipe collection.
    async fn find_recipes(&self, query: &RecipeQuery) -> Result<RecipePage, StoreError>;

    async fn get_recipe(&self, id: &str) -> Result<Option<Recipe>, StoreError>;

    /// Fetch several recipes by id. Unknown ids are skipped; the result
    /// follows the order of `ids`.
    async fn get_recipes(&self, ids: &[String]) -> Result<Vec<Recipe>, StoreError>;

    /// Replace a recipe's description. Returns the updated recipe, or
    /// `None` if no recipe has that id.
    async fn update_description(
        &self,
        id: &str,
        description: Option<&str>,
    ) -> Result<Option<Recipe>, StoreError>;

    /// Distinct non-empty categories, sorted.
    async fn categories(&self) -> Result<Vec<String>, StoreError>;

    /// Distinct tags, sorted.
    async fn tags(&self) -> Result<Vec<String>, StoreError>;

    /// Reviews of one recipe, newest first.
    async fn reviews(&self, recipe_id: &str) -> Result<Vec<Review>, StoreError>;

    /// Store a review. Returns `None` if the recipe does not exist.
    async fn add_review(
        &self,
        recipe_id: &str,
        review: &NewReview,
    ) -> Result<Option<Review>, StoreError>;

    /// Backend name for logs (e.g. "postgres", "memory").
    fn backend_name(&self) -> &'static str;
}

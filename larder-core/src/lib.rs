pub mod error;
pub mod ingredient;
pub mod query;
pub mod shopping;
pub mod store;
pub mod types;

pub use error::{StoreError, ValidationError};
pub use ingredient::{normalize_ingredient, parse_ingredient_terms};
pub use query::{
    evaluate, Direction, ListParams, PageRequest, PageSettings, Pagination, RecipeFilter,
    RecipePage, RecipeQuery, SortField, SortKey,
};
pub use shopping::{build_shopping_list, ShoppingItem, ShoppingQuantity};
pub use store::{MemoryStore, RecipeStore};
pub use types::{NewReview, Nutrition, Recipe, Review};

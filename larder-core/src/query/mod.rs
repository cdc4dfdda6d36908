//! Recipe listing contract: filter, order, paginate.
//!
//! [`RecipeQuery`] is the validated form of a listing request. Store
//! backends either evaluate it directly ([`evaluate`]) or translate it to
//! their own query language, but must return the same page.

mod filter;
mod page;
mod sort;

pub use filter::{RecipeFilter, ALL_CATEGORIES, MAX_INGREDIENT_TERMS, MAX_SEARCH_LEN};
pub use page::{PageRequest, PageSettings, Pagination};
pub use sort::{Direction, SortField, SortKey};

use crate::error::ValidationError;
use crate::types::Recipe;
use serde::Deserialize;
use utoipa::IntoParams;

/// Raw listing parameters as they arrive in the query string.
///
/// Everything is kept as text so that a bad `limit` can fall back to the
/// default instead of failing extraction.
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Case-insensitive text matched against title and description
    pub search: Option<String>,
    /// Exact category; "all" disables the filter
    pub category: Option<String>,
    /// Comma-separated ingredient terms; a recipe must contain every one
    pub ingredients: Option<String>,
    /// prep_asc, prep_desc, cook_asc, cook_desc, steps_asc, steps_desc,
    /// newest (default), oldest, name_asc, name_desc
    pub sort: Option<String>,
    /// Page number, starting at 1 (default: 1)
    pub page: Option<String>,
    /// Page size (default and maximum are server configuration)
    pub limit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeQuery {
    pub filter: RecipeFilter,
    pub sort: SortKey,
    pub page: PageRequest,
}

impl RecipeQuery {
    pub fn from_params(
        params: &ListParams,
        settings: &PageSettings,
    ) -> Result<Self, ValidationError> {
        let filter = RecipeFilter::new(
            params.search.as_deref(),
            params.category.as_deref(),
            params.ingredients.as_deref(),
        )?;
        let sort = SortKey::from_str_lossy(params.sort.as_deref());
        let page = PageRequest::from_params(
            params.page.as_deref(),
            params.limit.as_deref(),
            settings,
        )?;
        Ok(Self { filter, sort, page })
    }
}

/// One page of matches plus the total match count.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipePage {
    pub recipes: Vec<Recipe>,
    pub total: u64,
}

impl RecipePage {
    pub fn pagination(&self, request: PageRequest) -> Pagination {
        Pagination::new(request, self.total)
    }
}

/// Run a query over recipes held in memory.
pub fn evaluate<'a>(
    recipes: impl IntoIterator<Item = &'a Recipe>,
    query: &RecipeQuery,
) -> RecipePage {
    let mut matches: Vec<&Recipe> = recipes
        .into_iter()
        .filter(|r| query.filter.matches(r))
        .collect();
    matches.sort_by(|a, b| query.sort.compare(a, b));

    let total = matches.len() as u64;
    let recipes = query.page.window(matches).into_iter().cloned().collect();
    RecipePage { recipes, total }
}

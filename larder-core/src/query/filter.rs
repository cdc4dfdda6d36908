use crate::error::ValidationError;
use crate::ingredient::{normalize_ingredient, parse_ingredient_terms};
use crate::types::Recipe;

pub const MAX_SEARCH_LEN: usize = 200;
pub const MAX_INGREDIENT_TERMS: usize = 20;

/// Category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "all";

/// Conjunctive predicate over recipes.
///
/// Each populated field narrows the result; an empty filter matches every
/// recipe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    /// Lowercased, trimmed text matched against title or description
    pub search: Option<String>,
    /// Exact category
    pub category: Option<String>,
    /// Normalized ingredient terms; every one must be found
    pub ingredients: Vec<String>,
}

impl RecipeFilter {
    pub fn new(
        search: Option<&str>,
        category: Option<&str>,
        ingredients: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        if let Some(s) = search {
            let len = s.chars().count();
            if len > MAX_SEARCH_LEN {
                return Err(ValidationError::SearchTooLong {
                    len,
                    max: MAX_SEARCH_LEN,
                });
            }
        }

        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(ALL_CATEGORIES));

        let ingredients = ingredients.map(parse_ingredient_terms).unwrap_or_default();
        if ingredients.len() > MAX_INGREDIENT_TERMS {
            return Err(ValidationError::TooManyIngredients {
                count: ingredients.len(),
                max: MAX_INGREDIENT_TERMS,
            });
        }

        Ok(Self {
            search: search.map(str::to_lowercase),
            category: category.map(str::to_string),
            ingredients,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.category.is_none() && self.ingredients.is_empty()
    }

    pub fn matches(&self, recipe: &Recipe) -> bool {
        if let Some(ref category) = self.category {
            if recipe.category != *category {
                return false;
            }
        }

        if let Some(ref search) = self.search {
            let in_title = recipe.title.to_lowercase().contains(search.as_str());
            let in_description = recipe
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(search.as_str()));
            if !in_title && !in_description {
                return false;
            }
        }

        if !self.ingredients.is_empty() {
            let names: Vec<String> = recipe
                .ingredients
                .keys()
                .map(|name| normalize_ingredient(name))
                .collect();
            let all_found = self
                .ingredients
                .iter()
                .all(|term| names.iter().any(|name| name.contains(term.as_str())));
            if !all_found {
                return false;
            }
        }

        true
    }

    /// `ILIKE` pattern for the search text, with LIKE wildcards escaped.
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_ref().map(|s| like_contains(s))
    }

    /// `LIKE` patterns for the ingredient terms, in term order.
    pub fn ingredient_patterns(&self) -> Vec<String> {
        self.ingredients.iter().map(|t| like_contains(t)).collect()
    }
}

fn like_contains(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn recipe(title: &str, category: &str, ingredients: &[&str]) -> Recipe {
        Recipe {
            id: title.to_lowercase().replace(' ', "-"),
            title: title.to_string(),
            description: Some("A weeknight favourite".to_string()),
            prep: 10,
            cook: 20,
            category: category.to_string(),
            servings: None,
            published: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            tags: vec![],
            ingredients: ingredients
                .iter()
                .map(|name| (name.to_string(), "1".to_string()))
                .collect(),
            instructions: vec![],
            images: vec![],
            nutrition: Default::default(),
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = RecipeFilter::new(None, None, None).unwrap();
        assert!(filter.is_empty());
        assert!(filter.matches(&recipe("Soup", "Dinner", &[])));
    }

    #[test]
    fn test_all_category_is_no_filter() {
        let all = RecipeFilter::new(None, Some("all"), None).unwrap();
        let upper = RecipeFilter::new(None, Some("ALL"), None).unwrap();
        let none = RecipeFilter::new(None, None, None).unwrap();
        assert_eq!(all, none);
        assert_eq!(upper, none);
    }

    #[test]
    fn test_category_exact_match() {
        let filter = RecipeFilter::new(None, Some("Dessert"), None).unwrap();
        assert!(filter.matches(&recipe("Pie", "Dessert", &[])));
        assert!(!filter.matches(&recipe("Pie", "Desserts", &[])));
    }

    #[test]
    fn test_search_matches_title_or_description() {
        let filter = RecipeFilter::new(Some("  SOUP "), None, None).unwrap();
        assert_eq!(filter.search.as_deref(), Some("soup"));
        assert!(filter.matches(&recipe("Tomato Soup", "Dinner", &[])));
        assert!(!filter.matches(&recipe("Tomato Salad", "Dinner", &[])));

        let weeknight = RecipeFilter::new(Some("weeknight"), None, None).unwrap();
        assert!(weeknight.matches(&recipe("Tomato Salad", "Dinner", &[])));
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let filter = RecipeFilter::new(Some("   "), None, None).unwrap();
        assert!(filter.search.is_none());
    }

    #[test]
    fn test_search_too_long() {
        let long = "a".repeat(MAX_SEARCH_LEN + 1);
        assert!(matches!(
            RecipeFilter::new(Some(&long), None, None),
            Err(ValidationError::SearchTooLong { .. })
        ));
    }

    #[test]
    fn test_ingredient_terms_are_conjunctive() {
        let filter = RecipeFilter::new(None, None, Some("flour,salt")).unwrap();
        assert!(!filter.matches(&recipe("Bread", "Baking", &["2 cups flour"])));
        assert!(filter.matches(&recipe(
            "Bread",
            "Baking",
            &["2 cups flour", "1 tsp. Sea Salt"]
        )));
    }

    #[test]
    fn test_ingredient_term_is_normalized() {
        let filter = RecipeFilter::new(None, None, Some("3 Large Eggs")).unwrap();
        assert_eq!(filter.ingredients, vec!["large eggs"]);
        assert!(filter.matches(&recipe("Omelette", "Breakfast", &["large eggs, beaten"])));
    }

    #[test]
    fn test_quantity_only_terms_do_not_match_everything() {
        let filter = RecipeFilter::new(None, None, Some("2 cups, 1 tsp")).unwrap();
        assert!(filter.ingredients.is_empty());
        assert!(filter.is_empty());
    }

    #[test]
    fn test_too_many_ingredient_terms() {
        // digits are stripped by normalization, so vary the letters instead
        let terms: Vec<String> = (0..=MAX_INGREDIENT_TERMS)
            .map(|i| "z".repeat(i + 1))
            .collect();
        assert!(matches!(
            RecipeFilter::new(None, None, Some(&terms.join(","))),
            Err(ValidationError::TooManyIngredients { count: 21, max: 20 })
        ));
    }

    #[test]
    fn test_search_pattern_escapes_wildcards() {
        let filter = RecipeFilter::new(Some("100%_real"), None, None).unwrap();
        assert_eq!(filter.search_pattern().as_deref(), Some("%100\\%\\_real%"));
    }
}

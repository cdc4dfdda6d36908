//! Combine the ingredient lists of several recipes into one shopping list.

use crate::ingredient::normalize_ingredient;
use crate::types::Recipe;
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingQuantity {
    pub quantity: String,
    pub recipe_id: String,
    pub recipe_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingItem {
    /// Ingredient name as first written
    pub name: String,
    /// Key the entries were merged on
    pub normalized: String,
    pub quantities: Vec<ShoppingQuantity>,
}

/// Merge ingredients that normalize to the same name.
///
/// Quantities are not added up: "2 cups" and "100 g" of flour stay two
/// lines under one item. Items come back ordered by normalized name.
pub fn build_shopping_list(recipes: &[Recipe]) -> Vec<ShoppingItem> {
    let mut items: BTreeMap<String, ShoppingItem> = BTreeMap::new();

    for recipe in recipes {
        for (name, quantity) in &recipe.ingredients {
            let mut key = normalize_ingredient(name);
            if key.is_empty() {
                // e.g. a name that is only a quantity; keep it visible anyway
                key = name.trim().to_lowercase();
            }
            if key.is_empty() {
                continue;
            }

            let item = items.entry(key.clone()).or_insert_with(|| ShoppingItem {
                name: name.trim().to_string(),
                normalized: key,
                quantities: Vec::new(),
            });
            item.quantities.push(ShoppingQuantity {
                quantity: quantity.trim().to_string(),
                recipe_id: recipe.id.clone(),
                recipe_title: recipe.title.clone(),
            });
        }
    }

    items.into_values().collect()
}

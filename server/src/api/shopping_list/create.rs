use crate::api::{ApiError, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use larder_core::{build_shopping_list, ShoppingItem, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;

pub const MAX_SHOPPING_RECIPES: usize = 50;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateShoppingListRequest {
    /// Recipes to shop for; duplicates are ignored
    pub recipe_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShoppingListResponse {
    pub success: bool,
    pub items: Vec<ShoppingItem>,
}

/// Build a merged shopping list for a set of recipes
#[utoipa::path(
    post,
    path = "/api/shopping-list",
    tag = "shopping_list",
    request_body = CreateShoppingListRequest,
    responses(
        (status = 200, description = "Merged ingredient list", body = ShoppingListResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "One or more recipes not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn create_shopping_list(
    State(state): State<AppState>,
    request: Result<Json<CreateShoppingListRequest>, JsonRejection>,
) -> Result<Json<ShoppingListResponse>, ApiError> {
    let Json(request) = request?;

    let mut seen = HashSet::new();
    let ids: Vec<String> = request
        .recipe_ids
        .into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty() && seen.insert(id.clone()))
        .collect();

    if ids.is_empty() || ids.len() > MAX_SHOPPING_RECIPES {
        return Err(ValidationError::RecipeIdCount {
            count: ids.len(),
            max: MAX_SHOPPING_RECIPES,
        }
        .into());
    }

    let recipes = state
        .store
        .get_recipes(&ids)
        .await
        .map_err(|e| state.store_error("Failed to build shopping list", e))?;

    if recipes.len() != ids.len() {
        let found: HashSet<&str> = recipes.iter().map(|r| r.id.as_str()).collect();
        let missing: Vec<&str> = ids
            .iter()
            .map(String::as_str)
            .filter(|id| !found.contains(id))
            .collect();
        return Err(ApiError::NotFound(format!(
            "Recipes not found: {}",
            missing.join(", ")
        )));
    }

    let items = build_shopping_list(&recipes);
    tracing::debug!(
        recipes = recipes.len(),
        items = items.len(),
        "built shopping list"
    );

    Ok(Json(ShoppingListResponse {
        success: true,
        items,
    }))
}

#[cfg(test)]
mod tests {
    use super::MAX_SHOPPING_RECIPES;
    use crate::api::test_support::{app, recipe, send};
    use axum::http::{Method, StatusCode};
    use larder_core::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    fn store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::with_recipes([
            recipe("bread", "Bread", "Baking", &["2 cups Flour", "salt"]),
            recipe("cake", "Cake", "Dessert", &["flour", "sugar"]),
        ]))
    }

    #[tokio::test]
    async fn test_merges_ingredients_across_recipes() {
        let (status, body) = send(
            app(store()),
            Method::POST,
            "/api/shopping-list",
            Some(json!({"recipeIds": ["bread", "cake", "bread"]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let items = body["items"].as_array().unwrap();
        let names: Vec<&str> = items
            .iter()
            .map(|i| i["normalized"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["flour", "salt", "sugar"]);
        assert_eq!(items[0]["quantities"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_recipe_is_not_found() {
        let (status, body) = send(
            app(store()),
            Method::POST,
            "/api/shopping-list",
            Some(json!({"recipeIds": ["bread", "pie"]})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["message"].as_str().unwrap().contains("pie"));
    }

    #[tokio::test]
    async fn test_recipe_id_count_bounds() {
        let (status, _) = send(
            app(store()),
            Method::POST,
            "/api/shopping-list",
            Some(json!({"recipeIds": []})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let ids: Vec<String> = (0..=MAX_SHOPPING_RECIPES).map(|i| format!("r{i}")).collect();
        let (status, _) = send(
            app(store()),
            Method::POST,
            "/api/shopping-list",
            Some(json!({ "recipeIds": ids })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

use crate::api::{ApiError, ErrorResponse};
use crate::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TagsResponse {
    pub success: bool,
    /// Distinct tags across all recipes, sorted
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoriesResponse {
    pub success: bool,
    /// Distinct categories across all recipes, sorted
    pub categories: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/api/recipes/tags",
    tag = "recipes",
    responses(
        (status = 200, description = "List of distinct tags", body = TagsResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn list_tags(State(state): State<AppState>) -> Result<Json<TagsResponse>, ApiError> {
    let tags = state
        .store
        .tags()
        .await
        .map_err(|e| state.store_error("Failed to fetch tags", e))?;

    Ok(Json(TagsResponse {
        success: true,
        tags,
    }))
}

#[utoipa::path(
    get,
    path = "/api/recipes/categories",
    tag = "recipes",
    responses(
        (status = 200, description = "List of distinct categories", body = CategoriesResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    let categories = state
        .store
        .categories()
        .await
        .map_err(|e| state.store_error("Failed to fetch categories", e))?;

    Ok(Json(CategoriesResponse {
        success: true,
        categories,
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{app, get_json, recipe};
    use axum::http::StatusCode;
    use larder_core::MemoryStore;
    use std::sync::Arc;

    fn store() -> Arc<MemoryStore> {
        let mut cake = recipe("cake", "Cake", "Dessert", &[]);
        cake.tags = vec!["sweet".to_string(), "baking".to_string()];
        Arc::new(MemoryStore::with_recipes([
            cake,
            recipe("soup", "Soup", "Dinner", &[]),
        ]))
    }

    #[tokio::test]
    async fn test_list_tags() {
        let (status, body) = get_json(app(store()), "/api/recipes/tags").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["tags"],
            serde_json::json!(["baking", "sweet", "weeknight"])
        );
    }

    #[tokio::test]
    async fn test_list_categories() {
        let (status, body) = get_json(app(store()), "/api/recipes/categories").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["categories"], serde_json::json!(["Dessert", "Dinner"]));
    }

    #[tokio::test]
    async fn test_categories_store_failure() {
        let store = store();
        store.fail_with("down");
        let (status, body) = get_json(app(store), "/api/recipes/categories").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Failed to fetch categories");
    }
}

use crate::api::{ApiError, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};
use larder_core::Recipe;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeResponse {
    pub success: bool,
    pub recipe: Recipe,
    /// Number of steps in `recipe.instructions`
    pub instruction_count: usize,
}

impl RecipeResponse {
    pub fn new(recipe: Recipe) -> Self {
        Self {
            success: true,
            instruction_count: recipe.instruction_count(),
            recipe,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = String, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe details", body = RecipeResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn get_recipe(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let Path(id) = id?;

    let recipe = state
        .store
        .get_recipe(&id)
        .await
        .map_err(|e| state.store_error("Failed to fetch recipe", e))?
        .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;

    Ok(Json(RecipeResponse::new(recipe)))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{app, get_json, recipe};
    use axum::http::StatusCode;
    use larder_core::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_get_recipe_with_instruction_count() {
        let store = Arc::new(MemoryStore::with_recipes([recipe(
            "toast",
            "Toast",
            "Breakfast",
            &["bread"],
        )]));
        let (status, body) = get_json(app(store), "/api/recipes/toast").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["recipe"]["title"], "Toast");
        assert_eq!(body["recipe"]["ingredients"]["bread"], "1 cup");
        assert_eq!(body["instructionCount"], 2);
    }

    #[tokio::test]
    async fn test_get_missing_recipe() {
        let (status, body) =
            get_json(app(Arc::new(MemoryStore::new())), "/api/recipes/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Recipe not found");
    }
}

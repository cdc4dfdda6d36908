use super::get::RecipeResponse;
use crate::api::{ApiError, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use larder_core::ValidationError;
use serde::Deserialize;
use utoipa::ToSchema;

pub const MAX_DESCRIPTION_LEN: usize = 5000;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateDescriptionRequest {
    /// New description; null or blank clears it
    pub description: Option<String>,
}

#[utoipa::path(
    patch,
    path = "/api/recipes/{id}/description",
    tag = "recipes",
    params(
        ("id" = String, Path, description = "Recipe ID")
    ),
    request_body = UpdateDescriptionRequest,
    responses(
        (status = 200, description = "Updated recipe", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn update_description(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    request: Result<Json<UpdateDescriptionRequest>, JsonRejection>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let Path(id) = id?;
    let Json(request) = request?;

    let description = request
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());
    if description.is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LEN) {
        return Err(ValidationError::TooLong {
            field: "description",
            max: MAX_DESCRIPTION_LEN,
        }
        .into());
    }

    let recipe = state
        .store
        .update_description(&id, description)
        .await
        .map_err(|e| state.store_error("Failed to update recipe", e))?
        .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;

    tracing::info!(recipe_id = %recipe.id, "updated recipe description");

    Ok(Json(RecipeResponse::new(recipe)))
}

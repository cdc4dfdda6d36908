use crate::api::{ApiError, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use larder_core::{ListParams, Pagination, Recipe, RecipeQuery};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListRecipesResponse {
    pub success: bool,
    pub recipes: Vec<Recipe>,
    pub pagination: Pagination,
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    params(ListParams),
    responses(
        (status = 200, description = "One page of matching recipes", body = ListRecipesResponse),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn list_recipes(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ListRecipesResponse>, ApiError> {
    let Query(params) = params?;
    let query = RecipeQuery::from_params(&params, &state.page_settings)?;

    let page = state
        .store
        .find_recipes(&query)
        .await
        .map_err(|e| state.store_error("Failed to fetch recipes", e))?;

    tracing::debug!(
        total = page.total,
        page = query.page.page(),
        sort = query.sort.as_str(),
        "listed recipes"
    );

    let pagination = page.pagination(query.page);
    Ok(Json(ListRecipesResponse {
        success: true,
        recipes: page.recipes,
        pagination,
    }))
}

use crate::api::{ApiError, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use larder_core::{NewReview, Review};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReviewsResponse {
    pub success: bool,
    /// Newest first
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateReviewResponse {
    pub success: bool,
    pub review: Review,
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}/reviews",
    tag = "reviews",
    params(
        ("id" = String, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Reviews of the recipe", body = ReviewsResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<ReviewsResponse>, ApiError> {
    let Path(id) = id?;

    let exists = state
        .store
        .get_recipe(&id)
        .await
        .map_err(|e| state.store_error("Failed to fetch reviews", e))?
        .is_some();
    if !exists {
        return Err(ApiError::NotFound("Recipe not found".to_string()));
    }

    let reviews = state
        .store
        .reviews(&id)
        .await
        .map_err(|e| state.store_error("Failed to fetch reviews", e))?;

    Ok(Json(ReviewsResponse {
        success: true,
        reviews,
    }))
}

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/reviews",
    tag = "reviews",
    params(
        ("id" = String, Path, description = "Recipe ID")
    ),
    request_body = NewReview,
    responses(
        (status = 201, description = "Review created", body = CreateReviewResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn create_review(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    request: Result<Json<NewReview>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateReviewResponse>), ApiError> {
    let Path(id) = id?;
    let Json(request) = request?;
    let review = request.validated()?;

    let review = state
        .store
        .add_review(&id, &review)
        .await
        .map_err(|e| state.store_error("Failed to save review", e))?
        .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;

    tracing::info!(recipe_id = %id, rating = review.rating, "review added");

    Ok((
        StatusCode::CREATED,
        Json(CreateReviewResponse {
            success: true,
            review,
        }),
    ))
}

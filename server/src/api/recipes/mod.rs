pub mod description;
pub mod get;
pub mod list;
pub mod reviews;
pub mod tags;

use crate::AppState;
use axum::routing::{get, patch};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_recipes))
        .route("/tags", get(tags::list_tags))
        .route("/categories", get(tags::list_categories))
        .route("/{id}", get(get::get_recipe))
        .route("/{id}/description", patch(description::update_description))
        .route(
            "/{id}/reviews",
            get(reviews::list_reviews).post(reviews::create_review),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_recipes,
        get::get_recipe,
        description::update_description,
        tags::list_tags,
        tags::list_categories,
        reviews::list_reviews,
        reviews::create_review,
    ),
    components(schemas(
        list::ListRecipesResponse,
        get::RecipeResponse,
        description::UpdateDescriptionRequest,
        tags::TagsResponse,
        tags::CategoriesResponse,
        reviews::ReviewsResponse,
        reviews::CreateReviewResponse,
        larder_core::Review,
        larder_core::NewReview,
    ))
)]
pub struct ApiDoc;

pub mod create;

use crate::AppState;
use axum::routing::post;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/shopping-list endpoints
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(create::create_shopping_list))
}

#[derive(OpenApi)]
#[openapi(
    paths(create::create_shopping_list),
    components(schemas(
        create::CreateShoppingListRequest,
        create::ShoppingListResponse,
        larder_core::ShoppingItem,
        larder_core::ShoppingQuantity,
    ))
)]
pub struct ApiDoc;

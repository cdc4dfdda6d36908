pub mod health;
pub mod recipes;
pub mod shopping_list;

use crate::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use larder_core::ValidationError;
use serde::Serialize;
use thiserror::Error;
use utoipa::{OpenApi, ToSchema};

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,
    pub message: String,
    /// Underlying error, only outside production
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Any failure a handler can return. Converted to [`ErrorResponse`].
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Internal {
        message: String,
        detail: Option<String>,
    },
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::BadRequest(format!("Invalid request: {}", e))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        ApiError::BadRequest(format!("Invalid request: {}", e.body_text()))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid request: {}", e.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(e: PathRejection) -> Self {
        ApiError::BadRequest(format!("Invalid request: {}", e.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, error) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message, None),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message, None),
            ApiError::Internal { message, detail } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message, detail)
            }
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                message,
                error,
            }),
        )
            .into_response()
    }
}

/// Returns the router for all /api endpoints
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health::health))
        .nest("/api/recipes", recipes::router())
        .nest("/api/shopping-list", shopping_list::router())
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    #[derive(OpenApi)]
    #[openapi(
        info(title = "larder", description = "Recipe discovery API"),
        components(schemas(
            ErrorResponse,
            larder_core::Recipe,
            larder_core::Nutrition,
            larder_core::Pagination,
            larder_core::SortKey,
        ))
    )]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    let modules: Vec<utoipa::openapi::OpenApi> = vec![
        health::ApiDoc::openapi(),
        recipes::ApiDoc::openapi(),
        shopping_list::ApiDoc::openapi(),
    ];

    for module_spec in modules {
        // Merge paths
        spec.paths.paths.extend(module_spec.paths.paths);

        // Merge components (schemas)
        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::router;
    use crate::state::AppContext;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use chrono::{TimeZone, Utc};
    use http_body_util::BodyExt;
    use larder_core::{MemoryStore, PageSettings, Recipe};
    use std::sync::Arc;
    use tower::ServiceExt;

    pub fn app(store: Arc<MemoryStore>) -> Router {
        app_with(store, PageSettings::default(), true)
    }

    pub fn app_with(store: Arc<MemoryStore>, page_settings: PageSettings, expose: bool) -> Router {
        let state = Arc::new(AppContext {
            store,
            page_settings,
            expose_error_details: expose,
            track_db_query_count: false,
        });
        router().with_state(state)
    }

    pub fn recipe(id: &str, title: &str, category: &str, ingredients: &[&str]) -> Recipe {
        Recipe {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
            prep: 10,
            cook: 20,
            category: category.to_string(),
            servings: Some("4".to_string()),
            published: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            tags: vec!["weeknight".to_string()],
            ingredients: ingredients
                .iter()
                .map(|name| (name.to_string(), "1 cup".to_string()))
                .collect(),
            instructions: vec!["Prepare.".to_string(), "Cook.".to_string()],
            images: vec![],
            nutrition: Default::default(),
        }
    }

    pub async fn send(
        app: Router,
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        send(app, Method::GET, uri, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_has_recipe_paths() {
        let spec = openapi();
        for path in [
            "/api/health",
            "/api/recipes",
            "/api/recipes/{id}",
            "/api/recipes/{id}/description",
            "/api/recipes/{id}/reviews",
            "/api/recipes/categories",
            "/api/recipes/tags",
            "/api/shopping-list",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_sort_key_schema_uses_query_names() {
        let json = serde_json::to_value(openapi()).unwrap();
        let expected: Vec<&str> = larder_core::SortKey::ALL
            .iter()
            .map(|key| key.as_str())
            .collect();
        assert_eq!(
            json["components"]["schemas"]["SortKey"]["enum"],
            serde_json::json!(expected)
        );
    }

    #[test]
    fn test_validation_error_is_bad_request() {
        let response =
            ApiError::from(ValidationError::InvalidPage("x".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_error_detail_omitted_when_absent() {
        let json = serde_json::to_value(ErrorResponse {
            success: false,
            message: "Failed".to_string(),
            error: None,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "message": "Failed"})
        );
    }
}

use crate::api::ApiError;
use crate::config::Config;
use larder_core::{PageSettings, RecipeStore, StoreError};
use std::sync::Arc;

/// Application state shared across all handlers
pub type AppState = Arc<AppContext>;

#[derive(Debug)]
pub struct AppContext {
    pub store: Arc<dyn RecipeStore>,
    pub page_settings: PageSettings,
    pub expose_error_details: bool,
    pub track_db_query_count: bool,
}

impl AppContext {
    pub fn new(store: Arc<dyn RecipeStore>, config: &Config) -> AppState {
        Arc::new(Self {
            store,
            page_settings: config.page_settings,
            expose_error_details: config.expose_error_details(),
            track_db_query_count: config.track_db_query_count,
        })
    }

    /// Log a store failure and turn it into a 500 with a generic message.
    pub fn store_error(&self, message: &str, err: StoreError) -> ApiError {
        tracing::error!(
            backend = self.store.backend_name(),
            error = %err,
            "{}",
            message
        );
        ApiError::Internal {
            message: message.to_string(),
            detail: self.expose_error_details.then(|| err.to_string()),
        }
    }
}

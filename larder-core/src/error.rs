use std::time::Duration;
use thiserror::Error;

/// Rejected request input. Always maps to a client error at the HTTP boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("page must be a positive integer, got {0:?}")]
    InvalidPage(String),

    #[error("search text is too long ({len} characters, max {max})")]
    SearchTooLong { len: usize, max: usize },

    #[error("too many ingredient terms ({count}, max {max})")]
    TooManyIngredients { count: usize, max: usize },

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(i32),

    #[error("between 1 and {max} recipe ids are required, got {count}")]
    RecipeIdCount { count: usize, max: usize },
}

/// Failure reported by a [`crate::RecipeStore`] backend.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("store connection failed: {0}")]
    Connection(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    #[error("stored record is malformed: {0}")]
    Corrupt(String),
}

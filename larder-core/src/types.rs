use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

pub const MAX_REVIEW_AUTHOR_LEN: usize = 100;
pub const MAX_REVIEW_COMMENT_LEN: usize = 2000;

/// Nutrition facts as published with the recipe. Values are free text
/// ("320 kcal", "12g") and any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Nutrition {
    #[serde(default)]
    pub calories: Option<String>,
    #[serde(default)]
    pub fat: Option<String>,
    #[serde(default)]
    pub saturated_fat: Option<String>,
    #[serde(default)]
    pub sodium: Option<String>,
    #[serde(default)]
    pub carbohydrates: Option<String>,
    #[serde(default)]
    pub fiber: Option<String>,
    #[serde(default)]
    pub sugar: Option<String>,
    #[serde(default)]
    pub protein: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Opaque identifier, supplied by whoever ingested the recipe
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Preparation time in minutes
    #[serde(default)]
    pub prep: i32,
    /// Cook time in minutes
    #[serde(default)]
    pub cook: i32,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub servings: Option<String>,
    pub published: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Ingredient name -> quantity ("flour" -> "2 cups")
    #[serde(default)]
    pub ingredients: BTreeMap<String, String>,
    /// Steps, in order
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub nutrition: Nutrition,
}

impl Recipe {
    /// Number of instruction steps. Derived, never persisted.
    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub recipe_id: String,
    pub author: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct NewReview {
    pub author: String,
    pub rating: i32,
    #[serde(default)]
    pub comment: Option<String>,
}

impl NewReview {
    /// Trim the free-text fields and check bounds. Blank comments become `None`.
    pub fn validated(self) -> Result<Self, ValidationError> {
        let author = self.author.trim().to_string();
        if author.is_empty() {
            return Err(ValidationError::MissingField("author"));
        }
        if author.chars().count() > MAX_REVIEW_AUTHOR_LEN {
            return Err(ValidationError::TooLong {
                field: "author",
                max: MAX_REVIEW_AUTHOR_LEN,
            });
        }
        if !(1..=5).contains(&self.rating) {
            return Err(ValidationError::RatingOutOfRange(self.rating));
        }

        let comment = self
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if let Some(ref c) = comment {
            if c.chars().count() > MAX_REVIEW_COMMENT_LEN {
                return Err(ValidationError::TooLong {
                    field: "comment",
                    max: MAX_REVIEW_COMMENT_LEN,
                });
            }
        }

        Ok(Self {
            author,
            rating: self.rating,
            comment,
        })
    }
}

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use larder_core::{Recipe, Review, StoreError};
use uuid::Uuid;

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RecipeRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub prep: i32,
    pub cook: i32,
    pub category: String,
    pub servings: Option<String>,
    pub published: DateTime<Utc>,
    pub tags: Vec<Option<String>>,
    pub ingredients: serde_json::Value,
    pub instructions: Vec<Option<String>>,
    pub images: Vec<Option<String>>,
    pub nutrition: serde_json::Value,
}

impl TryFrom<RecipeRow> for Recipe {
    type Error = StoreError;

    fn try_from(row: RecipeRow) -> Result<Self, Self::Error> {
        let ingredients = serde_json::from_value(row.ingredients).map_err(|e| {
            StoreError::Corrupt(format!("recipe {} ingredients: {}", row.id, e))
        })?;
        let nutrition = serde_json::from_value(row.nutrition)
            .map_err(|e| StoreError::Corrupt(format!("recipe {} nutrition: {}", row.id, e)))?;

        Ok(Recipe {
            id: row.id,
            title: row.title,
            description: row.description,
            prep: row.prep,
            cook: row.cook,
            category: row.category,
            servings: row.servings,
            published: row.published,
            tags: row.tags.into_iter().flatten().collect(),
            ingredients,
            instructions: row.instructions.into_iter().flatten().collect(),
            images: row.images.into_iter().flatten().collect(),
            nutrition,
        })
    }
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReviewRow {
    pub id: Uuid,
    pub recipe_id: String,
    pub author: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: row.id,
            recipe_id: row.recipe_id,
            author: row.author,
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::reviews)]
pub struct NewReviewRow<'a> {
    pub recipe_id: &'a str,
    pub author: &'a str,
    pub rating: i32,
    pub comment: Option<&'a str>,
}

//! PostgreSQL-backed [`RecipeStore`].
//!
//! Diesel is synchronous, so every call runs on the blocking pool under a
//! `db.query` span and an overall timeout. The pool itself also bounds
//! connection checkout and sets `statement_timeout` on each connection.

use crate::config::Config;
use crate::db::{self, DbPool};
use crate::models::{NewReviewRow, RecipeRow, ReviewRow};
use crate::raw_sql;
use crate::schema::{recipes, reviews};
use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_query;
use larder_core::{
    NewReview, Recipe, RecipeFilter, RecipePage, RecipeQuery, RecipeStore, Review, SortKey,
    StoreError,
};
use std::collections::HashMap;
use std::time::Duration;

type BoxedRecipes = recipes::BoxedQuery<'static, Pg>;

#[derive(QueryableByName)]
struct ValueRow {
    #[diesel(sql_type = diesel::sql_types::Text)]
    value: String,
}

pub struct PgStore {
    pool: DbPool,
    timeout: Duration,
}

impl std::fmt::Debug for PgStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgStore")
            .field("pool", &self.pool.state())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl PgStore {
    /// Open the pool and run migrations. Call once per process.
    pub fn connect(config: &Config) -> Result<Self, StoreError> {
        let pool = db::create_pool(config)?;
        let state = pool.state();
        tracing::info!(
            connections = state.connections,
            max_size = config.pool_size,
            "connected to recipe store"
        );
        Ok(Self {
            pool,
            timeout: config.query_timeout,
        })
    }

    /// Release the pool. Idle connections are closed when it drops.
    pub fn close(self) {
        let state = self.pool.state();
        tracing::info!(
            connections = state.connections,
            idle = state.idle_connections,
            "closing recipe store"
        );
        drop(self.pool);
    }

    async fn run<T, F>(&self, op: &'static str, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> Result<T, StoreError> + Send + 'static,
    {
        let pool = self.pool.clone();
        run_blocking(op, self.timeout, move || {
            let mut conn = pool
                .get()
                .map_err(|e| StoreError::Connection(e.to_string()))?;
            f(&mut conn)
        })
        .await
    }
}

/// Run blocking store work on the blocking pool inside a `db.query` span,
/// giving up after `timeout`. The span is created on the calling task so the
/// per-request query counter sees it.
async fn run_blocking<T, F>(op: &'static str, timeout: Duration, f: F) -> Result<T, StoreError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
{
    let span = tracing::info_span!("db.query", op);
    let task = tokio::task::spawn_blocking(move || {
        let _entered = span.enter();
        f()
    });

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(StoreError::Query(format!("{} task failed: {}", op, e))),
        Err(_) => {
            tracing::warn!(
                op,
                timeout_ms = timeout.as_millis() as u64,
                "store call timed out"
            );
            Err(StoreError::Timeout(timeout))
        }
    }
}

fn query_error(e: diesel::result::Error) -> StoreError {
    StoreError::Query(e.to_string())
}

/// Apply the filter predicate. Every clause is ANDed.
fn filtered(filter: &RecipeFilter) -> BoxedRecipes {
    let mut query = recipes::table.into_boxed();

    if let Some(ref category) = filter.category {
        query = query.filter(recipes::category.eq(category.clone()));
    }

    // ILIKE on title OR description
    if let Some(pattern) = filter.search_pattern() {
        query = query.filter(
            recipes::title
                .ilike(pattern.clone())
                .or(recipes::description.ilike(pattern)),
        );
    }

    // One EXISTS per term: each must match some ingredient name
    for pattern in filter.ingredient_patterns() {
        query = query.filter(crate::ingredient_name_matches!(pattern));
    }

    query
}

/// Apply the ordering for a sort key, then the id tie-break.
fn ordered(query: BoxedRecipes, sort: SortKey) -> BoxedRecipes {
    let query = match sort {
        SortKey::PrepAsc => query.order(recipes::prep.asc()),
        SortKey::PrepDesc => query.order(recipes::prep.desc()),
        SortKey::CookAsc => query.order(recipes::cook.asc()),
        SortKey::CookDesc => query.order(recipes::cook.desc()),
        SortKey::StepsAsc => query.order(raw_sql::instruction_count().asc()),
        SortKey::StepsDesc => query.order(raw_sql::instruction_count().desc()),
        SortKey::Newest => query.order(recipes::published.desc()),
        SortKey::Oldest => query.order(recipes::published.asc()),
        SortKey::NameAsc => query.order(raw_sql::title_bytewise().asc()),
        SortKey::NameDesc => query.order(raw_sql::title_bytewise().desc()),
    };
    query.then_order_by(recipes::id.asc())
}

fn find_page(conn: &mut PgConnection, query: &RecipeQuery) -> Result<RecipePage, StoreError> {
    let limit = i64::from(query.page.limit());
    let offset = i64::try_from(query.page.skip()).unwrap_or(i64::MAX);

    let rows: Vec<(RecipeRow, i64)> = ordered(filtered(&query.filter), query.sort)
        .select((RecipeRow::as_select(), raw_sql::count_over()))
        .limit(limit)
        .offset(offset)
        .load(conn)
        .map_err(query_error)?;

    // The window count is only visible when the page has rows
    let total = match rows.first() {
        Some((_, total)) => *total,
        None if offset > 0 => filtered(&query.filter)
            .count()
            .get_result::<i64>(conn)
            .map_err(query_error)?,
        None => 0,
    };

    let recipes = rows
        .into_iter()
        .map(|(row, _)| Recipe::try_from(row))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RecipePage {
        recipes,
        total: u64::try_from(total).unwrap_or(0),
    })
}

fn load_values(conn: &mut PgConnection, sql: &'static str) -> Result<Vec<String>, StoreError> {
    let rows: Vec<ValueRow> = sql_query(sql).load(conn).map_err(query_error)?;
    Ok(rows.into_iter().map(|r| r.value).collect())
}

#[async_trait]
impl RecipeStore for PgStore {
    async fn find_recipes(&self, query: &RecipeQuery) -> Result<RecipePage, StoreError> {
        let query = query.clone();
        self.run("find_recipes", move |conn| find_page(conn, &query))
            .await
    }

    async fn get_recipe(&self, id: &str) -> Result<Option<Recipe>, StoreError> {
        let id = id.to_string();
        self.run("get_recipe", move |conn| {
            recipes::table
                .find(&id)
                .select(RecipeRow::as_select())
                .first(conn)
                .optional()
                .map_err(query_error)?
                .map(Recipe::try_from)
                .transpose()
        })
        .await
    }

    async fn get_recipes(&self, ids: &[String]) -> Result<Vec<Recipe>, StoreError> {
        let ids = ids.to_vec();
        self.run("get_recipes", move |conn| {
            let rows: Vec<RecipeRow> = recipes::table
                .filter(recipes::id.eq_any(&ids))
                .select(RecipeRow::as_select())
                .load(conn)
                .map_err(query_error)?;

            let mut by_id: HashMap<String, Recipe> = HashMap::with_capacity(rows.len());
            for row in rows {
                let recipe = Recipe::try_from(row)?;
                by_id.insert(recipe.id.clone(), recipe);
            }
            Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
        })
        .await
    }

    async fn update_description(
        &self,
        id: &str,
        description: Option<&str>,
    ) -> Result<Option<Recipe>, StoreError> {
        let id = id.to_string();
        let description = description.map(str::to_string);
        self.run("update_description", move |conn| {
            diesel::update(recipes::table.find(&id))
                .set(recipes::description.eq(description))
                .returning(RecipeRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(query_error)?
                .map(Recipe::try_from)
                .transpose()
        })
        .await
    }

    async fn categories(&self) -> Result<Vec<String>, StoreError> {
        self.run("categories", |conn| {
            load_values(conn, raw_sql::DISTINCT_CATEGORIES_QUERY)
        })
        .await
    }

    async fn tags(&self) -> Result<Vec<String>, StoreError> {
        self.run("tags", |conn| {
            load_values(conn, raw_sql::DISTINCT_TAGS_QUERY)
        })
        .await
    }

    async fn reviews(&self, recipe_id: &str) -> Result<Vec<Review>, StoreError> {
        let recipe_id = recipe_id.to_string();
        self.run("reviews", move |conn| {
            let rows: Vec<ReviewRow> = reviews::table
                .filter(reviews::recipe_id.eq(&recipe_id))
                .order((reviews::created_at.desc(), reviews::id.asc()))
                .select(ReviewRow::as_select())
                .load(conn)
                .map_err(query_error)?;
            Ok(rows.into_iter().map(Review::from).collect())
        })
        .await
    }

    async fn add_review(
        &self,
        recipe_id: &str,
        review: &NewReview,
    ) -> Result<Option<Review>, StoreError> {
        let recipe_id = recipe_id.to_string();
        let review = review.clone();
        self.run("add_review", move |conn| {
            conn.transaction::<_, diesel::result::Error, _>(|conn| {
                let found: bool =
                    diesel::select(exists(recipes::table.find(&recipe_id))).get_result(conn)?;
                if !found {
                    return Ok(None);
                }

                let row: ReviewRow = diesel::insert_into(reviews::table)
                    .values(&NewReviewRow {
                        recipe_id: &recipe_id,
                        author: &review.author,
                        rating: review.rating,
                        comment: review.comment.as_deref(),
                    })
                    .returning(ReviewRow::as_returning())
                    .get_result(conn)?;
                Ok(Some(Review::from(row)))
            })
            .map_err(query_error)
        })
        .await
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

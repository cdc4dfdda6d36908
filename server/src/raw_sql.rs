//! Raw SQL fragments that can't be expressed in Diesel's type-safe DSL.
//!
//! # Safety
//!
//! All SQL in this module has been reviewed for SQL injection safety:
//! - User input is ALWAYS passed via `.bind()` parameters
//! - No string concatenation or interpolation with user data
//!
//! When adding new SQL here:
//! 1. Document why Diesel DSL can't be used
//! 2. Ensure all user input uses `.bind()`

use diesel::dsl::sql;
use diesel::expression::SqlLiteral;
use diesel::sql_types::{BigInt, Integer, Text};

/// Window function for counting total rows across the full result set.
///
/// Returns `COUNT(*) OVER()` which gives the total count before LIMIT/OFFSET.
/// Diesel doesn't support window functions natively.
///
/// # Safety
/// Static SQL string with no user input.
pub fn count_over() -> SqlLiteral<BigInt> {
    sql::<BigInt>("COUNT(*) OVER()")
}

/// Number of instruction steps, computed per row.
///
/// The count is not stored, so sorting by it evaluates this expression for
/// every matching row.
///
/// # Safety
/// Static SQL string with no user input.
///
/// # Why raw SQL?
/// Diesel has no `cardinality()` for array columns.
pub fn instruction_count() -> SqlLiteral<Integer> {
    sql::<Integer>("cardinality(recipes.instructions)")
}

/// Recipe title under the "C" collation, i.e. plain byte order.
///
/// # Safety
/// Static SQL string with no user input.
///
/// # Why raw SQL?
/// Diesel can't attach a COLLATE clause to a column.
pub fn title_bytewise() -> SqlLiteral<Text> {
    sql::<Text>("recipes.title COLLATE \"C\"")
}

/// Filter expression: some ingredient name of the recipe, after
/// normalization, matches the LIKE pattern.
///
/// `normalize_ingredient` is the SQL function created by the initial
/// migration.
///
/// # Safety
/// The pattern is passed via `.bind()`, not interpolated.
///
/// # Why raw SQL?
/// Diesel has no support for `jsonb_object_keys` subqueries.
#[macro_export]
macro_rules! ingredient_name_matches {
    ($pattern:expr) => {
        diesel::dsl::sql::<diesel::sql_types::Bool>(
            "EXISTS (SELECT 1 FROM jsonb_object_keys(recipes.ingredients) AS k(name) \
             WHERE normalize_ingredient(k.name) LIKE ",
        )
        .bind::<diesel::sql_types::Text, _>($pattern)
        .sql(")")
    };
}

/// Distinct non-empty categories in byte order.
///
/// # Safety
/// Static SQL string with no user input.
pub const DISTINCT_CATEGORIES_QUERY: &str = "SELECT category AS value \
    FROM (SELECT DISTINCT category FROM recipes WHERE category <> '') c \
    ORDER BY category COLLATE \"C\"";

/// Distinct tags in byte order.
///
/// Uses `unnest()` to expand the tags array, which isn't in Diesel's DSL.
///
/// # Safety
/// Static SQL string with no user input.
pub const DISTINCT_TAGS_QUERY: &str = "SELECT tag AS value \
    FROM (SELECT DISTINCT unnest(tags) AS tag FROM recipes) t \
    WHERE tag IS NOT NULL \
    ORDER BY tag COLLATE \"C\"";

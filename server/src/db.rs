use crate::config::Config;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use larder_core::StoreError;
use std::time::Duration;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../migrations");

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Applies the configured statement timeout to every pooled connection.
#[derive(Debug)]
struct StatementTimeout(Duration);

impl CustomizeConnection<PgConnection, r2d2::Error> for StatementTimeout {
    fn on_acquire(&self, conn: &mut PgConnection) -> Result<(), r2d2::Error> {
        // Integer from configuration, not user input
        diesel::sql_query(format!("SET statement_timeout = {}", self.0.as_millis()))
            .execute(conn)
            .map(|_| ())
            .map_err(r2d2::Error::QueryError)
    }
}

/// Build the connection pool and bring the schema up to date.
pub fn create_pool(config: &Config) -> Result<DbPool, StoreError> {
    let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
    let pool = r2d2::Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(config.query_timeout)
        .connection_customizer(Box::new(StatementTimeout(config.query_timeout)))
        .build(manager)
        .map_err(|e| StoreError::Connection(format!("failed to create pool: {}", e)))?;

    // Run pending migrations on startup
    let mut conn = pool
        .get()
        .map_err(|e| StoreError::Connection(format!("failed to get connection: {}", e)))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| StoreError::Query(format!("failed to run migrations: {}", e)))?;
    for version in applied {
        tracing::info!(%version, "applied migration");
    }

    Ok(pool)
}

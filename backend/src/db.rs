use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PoolError};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Upper bound on any single statement, so a wedged query surfaces as a
/// store error instead of holding a pool slot forever.
const STATEMENT_TIMEOUT_MS: u32 = 5_000;

const MAX_POOL_SIZE: u32 = 10;

#[derive(Debug)]
struct StatementTimeout;

impl CustomizeConnection<PgConnection, diesel::r2d2::Error> for StatementTimeout {
    fn on_acquire(&self, conn: &mut PgConnection) -> Result<(), diesel::r2d2::Error> {
        diesel::sql_query(format!("SET statement_timeout = {}", STATEMENT_TIMEOUT_MS))
            .execute(conn)
            .map(|_| ())
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn build_pool(database_url: &str) -> Result<DbPool, PoolError> {
    Pool::builder()
        .max_size(MAX_POOL_SIZE)
        .connection_customizer(Box::new(StatementTimeout))
        .build(ConnectionManager::new(database_url))
}

pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| format!("Failed to run migrations: {}", e))?;
    for migration in applied {
        log::info!("Applied migration {}", migration);
    }
    Ok(())
}

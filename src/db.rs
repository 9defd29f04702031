pub mod logger;
pub mod pool;

use anyhow::{Context, Result, anyhow};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::models::NewUser;
use crate::schema::users;
use crate::settings::ServerSettings;

pub use pool::{DbConn, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Bring the schema up to date.
pub fn run_migrations(conn: &mut SqliteConnection) -> Result<()> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow!("failed to run migrations: {e}"))?;
    for version in applied {
        log::info!("Applied migration {version}");
    }
    Ok(())
}

/// Create default admin user if the users table is empty.
/// Returns true when the admin was created.
pub fn create_default_admin(
    conn: &mut SqliteConnection,
    password: &str,
) -> Result<bool> {
    let count: i64 = users::table.count().get_result(conn)?;
    if count > 0 {
        return Ok(false);
    }

    let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST).context("failed to hash admin password")?;
    diesel::insert_into(users::table)
        .values(&NewUser {
            username: "admin",
            password_hash: &hash,
            role: "admin",
        })
        .execute(conn)?;

    log::info!("Default admin user created");
    Ok(true)
}

/// Initialize the pool, migrate the schema and seed the admin user.
pub fn initialize(settings: &ServerSettings) -> Result<DbPool> {
    let pool = pool::init_pool(&settings.database_url, settings.pool_size)
        .with_context(|| format!("failed to open database {}", settings.database_url))?;

    let mut conn = pool.get().context("failed to get DB connection")?;
    run_migrations(&mut conn)?;
    create_default_admin(&mut conn, &settings.admin_password)?;

    Ok(pool)
}

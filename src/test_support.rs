//! Shared helpers for the unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use std::time::Duration;

    use chrono::NaiveDateTime;
    use diesel::prelude::*;
    use diesel::r2d2::{ConnectionManager, Pool};
    use diesel::sqlite::SqliteConnection;
    use tempfile::TempDir;

    use crate::bitacora::ActivityLog;
    use crate::db::{self, DbPool, pool};
    use crate::identity::CallerIdentity;
    use crate::models::NewUser;
    use crate::schema::{bitacora, users};

    /// Migrated database in a temp dir. Keep the `TempDir` alive for the test.
    pub fn test_pool() -> (TempDir, DbPool) {
        let dir = tempfile::tempdir().unwrap();
        let url = dir.path().join("bitacora.db").to_string_lossy().into_owned();
        let pool = pool::init_pool(&url, 4).unwrap();
        db::run_migrations(&mut pool.get().unwrap()).unwrap();
        (dir, pool)
    }

    /// A pool whose database can never be opened.
    pub fn broken_pool() -> DbPool {
        let manager = ConnectionManager::<SqliteConnection>::new("/nonexistent/liga/bitacora.db");
        Pool::builder()
            .max_size(1)
            .connection_timeout(Duration::from_millis(200))
            .build_unchecked(manager)
    }

    pub fn test_identity() -> CallerIdentity {
        CallerIdentity::new("10.0.0.7", "cancha-01")
    }

    pub fn test_log(pool: &DbPool) -> ActivityLog {
        ActivityLog::new(pool.clone(), "liga-admin").with_identity(test_identity())
    }

    /// Insert a LOGIN/INSERT row with an explicit timestamp, bypassing the
    /// database clock, so tests can place entries on chosen dates.
    pub fn insert_at(pool: &DbPool, actor: &str, action_kind: &str, entered_at: NaiveDateTime) -> i32 {
        let mut conn = pool.get().unwrap();
        diesel::insert_into(bitacora::table)
            .values((
                bitacora::actor.eq(actor),
                bitacora::entered_at.eq(entered_at),
                bitacora::client_label.eq("liga-admin"),
                bitacora::source_address.eq("10.0.0.7"),
                bitacora::source_host.eq("cancha-01"),
                bitacora::affected_table.eq("users"),
                bitacora::action_kind.eq(action_kind),
                bitacora::description.eq(format!("{action_kind} by {actor}")),
            ))
            .execute(&mut conn)
            .unwrap();
        bitacora::table
            .select(diesel::dsl::max(bitacora::id))
            .first::<Option<i32>>(&mut conn)
            .unwrap()
            .unwrap()
    }

    pub fn create_user(pool: &DbPool, username: &str, password: &str, role: &str) {
        let hash = bcrypt::hash(password, 4).unwrap();
        diesel::insert_into(users::table)
            .values(&NewUser {
                username,
                password_hash: &hash,
                role,
            })
            .execute(&mut pool.get().unwrap())
            .unwrap();
    }
}

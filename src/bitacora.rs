//! Activity log (bitácora) service.
//!
//! Append-only record of who did what, when and from where, plus the
//! LOGIN/logout bracketing of user sessions. Writes are fire-and-forget:
//! a failed write is reported through the diagnostic log and dropped, so it
//! can never fail the business action it was attached to. Reads propagate
//! their errors.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use diesel::dsl::{max, min, sql};
use diesel::prelude::*;
use diesel::sql_types::{Nullable, Timestamp};
use serde::{Deserialize, Serialize};

use crate::db::DbPool;
use crate::error::LogError;
use crate::identity::{IdentitySource, LocalIdentity};
use crate::models::{LogEntry, NewLogEntry};
use crate::schema::bitacora;

/// Actor recorded when the caller has no session.
pub const UNKNOWN_ACTOR: &str = "unknown";

/// Common action kinds. The column is an open tag, these are just the ones
/// the application itself writes.
pub mod action {
    pub const INSERT: &str = "INSERT";
    pub const UPDATE: &str = "UPDATE";
    pub const DELETE: &str = "DELETE";
    pub const LOGIN: &str = "LOGIN";
}

/// Filter criteria for [`ActivityLog::list`]. Every set field must match.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogFilter {
    pub actor: Option<String>,
    pub affected_table: Option<String>,
    pub action_kind: Option<String>,
    /// Inclusive, compared against the (UTC) date of `entered_at`.
    pub from: Option<NaiveDate>,
    /// Inclusive, compared against the (UTC) date of `entered_at`.
    pub to: Option<NaiveDate>,
}

/// Distinct values present in the log, for building filter selectors.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub actors: Vec<String>,
    pub tables: Vec<String>,
    pub actions: Vec<String>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// Millisecond-precision timestamp from the database clock, in the same
/// text layout the `entered_at` column default uses.
const STORAGE_NOW: &str = "strftime('%Y-%m-%d %H:%M:%f', 'now')";

#[derive(Clone)]
pub struct ActivityLog {
    pool: DbPool,
    client_label: String,
    identity: Arc<dyn IdentitySource>,
}

impl ActivityLog {
    /// Log service writing through `pool`, tagging entries with `client_label`
    /// unless a caller overrides it.
    pub fn new(pool: DbPool, client_label: impl Into<String>) -> Self {
        Self {
            pool,
            client_label: client_label.into(),
            identity: Arc::new(LocalIdentity),
        }
    }

    pub fn with_identity(mut self, identity: impl IdentitySource + 'static) -> Self {
        self.identity = Arc::new(identity);
        self
    }

    pub fn client_label(&self) -> &str {
        &self.client_label
    }

    /// Append an entry under the default client label.
    pub fn record(&self, table: &str, action: &str, description: &str, actor: Option<&str>) {
        self.record_with_label(table, action, description, actor, &self.client_label);
    }

    /// Append an entry. Never fails from the caller's point of view.
    pub fn record_with_label(
        &self,
        table: &str,
        action: &str,
        description: &str,
        actor: Option<&str>,
        client_label: &str,
    ) {
        let actor = actor
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(UNKNOWN_ACTOR);

        match self.try_record(table, action, description, actor, client_label) {
            Ok(()) => log::info!("Entry recorded in bitacora: {actor} - {action} on {table}"),
            Err(e) => log::error!("Failed to record {action} on {table} for {actor}: {e}"),
        }
    }

    fn try_record(
        &self,
        table: &str,
        action: &str,
        description: &str,
        actor: &str,
        client_label: &str,
    ) -> Result<(), LogError> {
        if table.trim().is_empty() {
            return Err(LogError::EmptyField("table"));
        }
        if action.trim().is_empty() {
            return Err(LogError::EmptyField("action"));
        }

        let identity = self.identity.resolve();
        let mut conn = self.pool.get()?;

        diesel::insert_into(bitacora::table)
            .values(&NewLogEntry {
                actor,
                client_label,
                source_address: &identity.address,
                source_host: &identity.host,
                affected_table: table,
                action_kind: action,
                description,
            })
            .execute(&mut conn)?;

        Ok(())
    }

    /// Stamp `left_at` on the actor's most recent open LOGIN entry.
    /// Does nothing if the actor has no open session.
    pub fn close_session(&self, actor: &str) {
        match self.try_close_session(actor) {
            Ok(Some(id)) => log::info!("Session {id} closed for {actor}"),
            Ok(None) => log::warn!("No open session to close for {actor}"),
            Err(e) => log::error!("Failed to close session for {actor}: {e}"),
        }
    }

    fn try_close_session(&self, actor: &str) -> Result<Option<i32>, LogError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, LogError, _>(|conn| {
            let open: Option<i32> = bitacora::table
                .filter(bitacora::actor.eq(actor))
                .filter(bitacora::action_kind.eq(action::LOGIN))
                .filter(bitacora::left_at.is_null())
                .order((bitacora::entered_at.desc(), bitacora::id.desc()))
                .select(bitacora::id)
                .first(conn)
                .optional()?;

            if let Some(entry_id) = open {
                diesel::update(
                    bitacora::table
                        .filter(bitacora::id.eq(entry_id))
                        .filter(bitacora::left_at.is_null()),
                )
                .set(bitacora::left_at.eq(sql::<Nullable<Timestamp>>(STORAGE_NOW)))
                .execute(conn)?;
            }

            Ok(open)
        })
    }

    /// Entries matching `filter`, most recent first.
    pub fn list(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, LogError> {
        let mut conn = self.pool.get()?;
        let mut query = bitacora::table.into_boxed();

        if let Some(actor) = &filter.actor {
            query = query.filter(bitacora::actor.eq(actor));
        }
        if let Some(table) = &filter.affected_table {
            query = query.filter(bitacora::affected_table.eq(table));
        }
        if let Some(kind) = &filter.action_kind {
            query = query.filter(bitacora::action_kind.eq(kind));
        }
        if let Some(from) = filter.from {
            query = query.filter(bitacora::entered_at.ge(start_of(from)));
        }
        if let Some(to) = filter.to {
            // Upper bound is exclusive midnight of the following day; no bound
            // at all once the calendar runs out.
            if let Some(next) = to.succ_opt() {
                query = query.filter(bitacora::entered_at.lt(start_of(next)));
            }
        }

        let entries = query
            .order((bitacora::entered_at.desc(), bitacora::id.desc()))
            .select(LogEntry::as_select())
            .load(&mut conn)?;

        Ok(entries)
    }

    pub fn filter_options(&self) -> Result<FilterOptions, LogError> {
        let mut conn = self.pool.get()?;

        let actors = bitacora::table
            .select(bitacora::actor)
            .distinct()
            .order(bitacora::actor.asc())
            .load::<String>(&mut conn)?;
        let tables = bitacora::table
            .select(bitacora::affected_table)
            .distinct()
            .order(bitacora::affected_table.asc())
            .load::<String>(&mut conn)?;
        let actions = bitacora::table
            .select(bitacora::action_kind)
            .distinct()
            .order(bitacora::action_kind.asc())
            .load::<String>(&mut conn)?;
        let (first, last) = bitacora::table
            .select((min(bitacora::entered_at), max(bitacora::entered_at)))
            .first::<(Option<NaiveDateTime>, Option<NaiveDateTime>)>(&mut conn)?;

        Ok(FilterOptions {
            actors,
            tables,
            actions,
            first_date: first.map(|t| t.date()),
            last_date: last.map(|t| t.date()),
        })
    }
}

fn start_of(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN)
}

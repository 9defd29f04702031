use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{bitacora, users};

/// One row of the activity log.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = bitacora)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LogEntry {
    pub id: i32,
    pub actor: String,
    pub entered_at: NaiveDateTime,
    pub left_at: Option<NaiveDateTime>,
    pub client_label: String,
    pub source_address: String,
    pub source_host: String,
    pub affected_table: String,
    pub action_kind: String,
    pub description: String,
}

/// Insert payload for the activity log. `entered_at` is left out on purpose:
/// the column default stamps it with the database clock.
#[derive(Debug, Insertable)]
#[diesel(table_name = bitacora)]
pub struct NewLogEntry<'a> {
    pub actor: &'a str,
    pub client_label: &'a str,
    pub source_address: &'a str,
    pub source_host: &'a str,
    pub affected_table: &'a str,
    pub action_kind: &'a str,
    pub description: &'a str,
}

#[derive(Queryable, Selectable, Clone, Debug)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserRow {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub role: String,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
}

//! Error types for the activity log and the request guards.

use diesel::r2d2::PoolError;
use thiserror::Error;

/// Errors from activity log storage operations.
#[derive(Debug, Error)]
pub enum LogError {
    /// No connection could be checked out of the pool.
    #[error("connection pool unavailable: {0}")]
    Pool(#[from] PoolError),

    /// A statement against the log table failed.
    #[error("query failed: {0}")]
    Query(#[from] diesel::result::Error),

    /// A required tag was blank.
    #[error("`{0}` must not be empty")]
    EmptyField(&'static str),
}

/// Reasons a request could not be tied to a logged-in user.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no session cookie")]
    MissingSession,

    #[error("session refers to an unknown user")]
    UnknownUser,

    #[error("user lookup failed: {0}")]
    Lookup(String),
}

//! Database error taxonomy
//!
//! All classification of backend errors happens here. The worker only
//! matches on the variants and never inspects MySQL error codes itself.

use std::time::Duration;
use thiserror::Error;

/// Database result type
pub type DbResult<T> = Result<T, DbError>;

/// Database errors, grouped by how the worker reacts to them.
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection could not be established; retried with backoff.
    #[error("connect failed: {0}")]
    Connect(String),

    /// Connect did not finish within the configured timeout.
    #[error("connect timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// The connection died under a statement; forces a reconnect.
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// Statement-level failure (syntax, permissions, ...); the session
    /// stays usable.
    #[error("query failed: {0}")]
    Query(String),

    /// Anything the adapter could not classify. The worker treats this
    /// as the most severe non-fatal class.
    #[error("unexpected database error: {0}")]
    Unexpected(String),
}

impl DbError {
    pub fn is_connection_lost(&self) -> bool {
        matches!(self, DbError::ConnectionLost(_))
    }
}

/// MySQL server error numbers that indicate the connection (or the node
/// behind it) is gone: too many connections (1040), ipsock error (1081),
/// lock wait timeout (1205), query interrupted (1317).
pub(crate) const CONNECTION_LOST_CODES: &[u16] = &[1040, 1081, 1205, 1317];

/// Map a query-time sqlx error into the taxonomy. Transport-level
/// failures and the code table above force a reconnect; other server
/// errors keep the session.
pub(crate) fn classify_query_error(err: sqlx::Error) -> DbError {
    match &err {
        sqlx::Error::Database(db) => {
            let lost = db
                .try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>()
                .map(|e| CONNECTION_LOST_CODES.contains(&e.number()))
                .unwrap_or(false);
            if lost {
                DbError::ConnectionLost(err.to_string())
            } else {
                DbError::Query(err.to_string())
            }
        }
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::Protocol(_) => {
            DbError::ConnectionLost(err.to_string())
        }
        _ => DbError::Unexpected(err.to_string()),
    }
}

/// All connect-phase failures land in the same retried-with-backoff class.
pub(crate) fn classify_connect_error(err: sqlx::Error) -> DbError {
    DbError::Connect(err.to_string())
}

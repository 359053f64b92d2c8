//! Connector and session seams
//!
//! The worker state machine is generic over these traits; the MySQL
//! implementation lives in [`crate::mysql`] and tests substitute
//! scripted fakes.

use async_trait::async_trait;

use crate::error::DbError;

/// Opens one plain connection per call. No pooling: every worker owns
/// its connection outright.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Session: Session;

    async fn connect(&self) -> Result<Self::Session, DbError>;
}

/// One live connection, owned exclusively by one worker.
#[async_trait]
pub trait Session: Send + 'static {
    /// Server-side connection id, when the backend exposes one.
    fn id(&self) -> Option<u64>;

    /// Execute one statement and drain its result rows completely.
    async fn execute(&mut self, sql: &str) -> Result<(), DbError>;

    /// Release the connection. Idempotent; close failures are logged,
    /// never returned.
    async fn close(&mut self);

    /// Best-effort liveness. A session can still die between this check
    /// and the next statement.
    fn is_alive(&self) -> bool;
}

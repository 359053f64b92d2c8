//! sqlx-backed MySQL connector and session

use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection};
use tracing::{debug, warn};

use faultline_config::DatabaseConfig;

use crate::error::{classify_connect_error, classify_query_error, DbError};
use crate::session::{Connector, Session};

/// Lightweight availability probe.
pub const SHORT_QUERY: &str = "SELECT 1";

/// Statement that blocks the server for `duration`, simulating an
/// in-flight long-running operation during a failover event.
pub fn long_query(duration: Duration) -> String {
    format!("SELECT SLEEP({})", duration.as_secs())
}

/// Opens one plain (non-pooled) MySQL connection per call.
#[derive(Debug, Clone)]
pub struct MySqlConnector {
    config: DatabaseConfig,
}

impl MySqlConnector {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    fn options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.config.host)
            .port(self.config.port)
            .username(&self.config.user)
            .password(&self.config.password)
            .database(&self.config.database)
            .log_statements(log::LevelFilter::Debug)
            // The long query is slow on purpose; don't warn about it.
            .log_slow_statements(log::LevelFilter::Debug, Duration::from_secs(1))
    }
}

#[async_trait]
impl Connector for MySqlConnector {
    type Session = MySqlSession;

    async fn connect(&self) -> Result<MySqlSession, DbError> {
        let options = self.options();
        let connect = MySqlConnection::connect_with(&options);
        let mut conn = tokio::time::timeout(self.config.connect_timeout, connect)
            .await
            .map_err(|_| DbError::ConnectTimeout(self.config.connect_timeout))?
            .map_err(classify_connect_error)?;

        // Server-side id, for correlating log lines against processlist
        // output during a failover exercise.
        let id = sqlx::query_scalar::<_, u64>("SELECT CONNECTION_ID()")
            .fetch_one(&mut conn)
            .await
            .map_err(classify_connect_error)?;

        Ok(MySqlSession {
            conn: Some(conn),
            id,
        })
    }
}

/// One live MySQL connection.
pub struct MySqlSession {
    conn: Option<MySqlConnection>,
    id: u64,
}

#[async_trait]
impl Session for MySqlSession {
    fn id(&self) -> Option<u64> {
        Some(self.id)
    }

    async fn execute(&mut self, sql: &str) -> Result<(), DbError> {
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| DbError::ConnectionLost("session already closed".to_string()))?;

        // fetch_all drains every row, so the statement is known complete
        // before pacing starts.
        sqlx::query(sql)
            .fetch_all(&mut *conn)
            .await
            .map(|_| ())
            .map_err(classify_query_error)
    }

    async fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            match conn.close().await {
                Ok(()) => debug!(connection_id = self.id, "connection closed"),
                Err(err) => {
                    warn!(connection_id = self.id, error = %err, "error closing connection")
                }
            }
        }
    }

    fn is_alive(&self) -> bool {
        self.conn.is_some()
    }
}

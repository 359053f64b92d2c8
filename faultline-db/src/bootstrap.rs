//! One-shot database bootstrap

use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::Connection;
use tracing::{info, warn};

use faultline_config::DatabaseConfig;

use crate::error::{classify_connect_error, classify_query_error, DbError};

/// Create the target database if it does not exist yet.
///
/// Runs over a separate short-lived connection with no database
/// selected, before any worker starts. Failures here are fatal to the
/// caller.
pub async fn ensure_database(config: &DatabaseConfig) -> Result<(), DbError> {
    info!(database = %config.database, "ensuring database exists");

    let options = MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password);

    let connect = MySqlConnection::connect_with(&options);
    let mut conn = tokio::time::timeout(config.connect_timeout, connect)
        .await
        .map_err(|_| DbError::ConnectTimeout(config.connect_timeout))?
        .map_err(classify_connect_error)?;

    let stmt = create_database_statement(&config.database);
    let result = sqlx::query(&stmt).execute(&mut conn).await;

    if let Err(err) = conn.close().await {
        warn!(error = %err, "error closing bootstrap connection");
    }

    result.map_err(classify_query_error)?;
    info!(database = %config.database, "database created or already present");
    Ok(())
}

/// Identifiers cannot be bound as parameters; quote and escape by hand.
fn create_database_statement(name: &str) -> String {
    format!(
        "CREATE DATABASE IF NOT EXISTS `{}`",
        name.replace('`', "``")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_quotes_identifier() {
        assert_eq!(
            create_database_statement("ha_test"),
            "CREATE DATABASE IF NOT EXISTS `ha_test`"
        );
    }

    #[test]
    fn test_statement_escapes_backticks() {
        assert_eq!(
            create_database_statement("odd`name"),
            "CREATE DATABASE IF NOT EXISTS `odd``name`"
        );
    }
}

//! CLI argument parsing definitions

use clap::Parser;
use std::time::Duration;

use faultline_config::{
    ConfigError, ConfigResult, DatabaseConfig, FaultlineConfig, LoadConfig, LogLevel,
    LoggingConfig,
};

/// MySQL HA load test client: keeps a pool of simulated application
/// users querying the target cluster and shows, through its log stream,
/// how the cluster behaves under load and through failovers.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// MySQL server hostname or IP address (or load balancer address)
    #[arg(long, value_name = "HOST")]
    pub host: String,

    /// MySQL server port
    #[arg(long, value_name = "PORT", default_value_t = 3306)]
    pub port: u16,

    /// MySQL username
    #[arg(long, value_name = "USER")]
    pub user: String,

    /// MySQL password
    #[arg(long, value_name = "PASSWORD")]
    pub password: String,

    /// MySQL database name
    #[arg(long, value_name = "NAME")]
    pub database: String,

    /// Create the database if it does not exist
    #[arg(long)]
    pub create_db: bool,

    /// Number of concurrent workers
    #[arg(long, value_name = "COUNT", default_value_t = 5)]
    pub workers: usize,

    /// Approximate seconds between short queries
    #[arg(long, value_name = "SECONDS", default_value_t = 0.5)]
    pub short_query_interval: f64,

    /// Probability (0.0 to 1.0) of running a long query instead of a short one
    #[arg(long, value_name = "CHANCE", default_value_t = 0.1)]
    pub long_query_chance: f64,

    /// Duration in seconds of the simulated long query (SELECT SLEEP)
    #[arg(long, value_name = "SECONDS", default_value_t = 10)]
    pub long_query_duration: u64,

    /// Connection timeout in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 10)]
    pub connect_timeout: u64,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl Cli {
    /// Assemble the runtime configuration. Flag values that cannot be
    /// represented (e.g. a negative interval) are rejected here; range
    /// checks live in the config domains.
    pub fn into_config(self) -> ConfigResult<FaultlineConfig> {
        let short_query_interval = Duration::try_from_secs_f64(self.short_query_interval)
            .map_err(|_| ConfigError::DomainError {
                domain: "load".to_string(),
                message: format!(
                    "short_query_interval must be a non-negative number of seconds, got {}",
                    self.short_query_interval
                ),
            })?;

        Ok(FaultlineConfig {
            database: DatabaseConfig {
                host: self.host,
                port: self.port,
                user: self.user,
                password: self.password,
                database: self.database,
                connect_timeout: Duration::from_secs(self.connect_timeout),
                create_missing: self.create_db,
            },
            load: LoadConfig {
                workers: self.workers,
                short_query_interval,
                long_query_chance: self.long_query_chance,
                long_query_duration: Duration::from_secs(self.long_query_duration),
                ..LoadConfig::default()
            },
            logging: LoggingConfig {
                level: self.log_level.unwrap_or_default(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec![
            "faultline",
            "--host",
            "db.example.com",
            "--user",
            "app",
            "--password",
            "secret",
            "--database",
            "ha_test",
        ];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_defaults_match_contract() {
        let cli = parse(&[]);
        assert_eq!(cli.port, 3306);
        assert_eq!(cli.workers, 5);
        assert_eq!(cli.short_query_interval, 0.5);
        assert_eq!(cli.long_query_chance, 0.1);
        assert_eq!(cli.long_query_duration, 10);
        assert_eq!(cli.connect_timeout, 10);
        assert!(!cli.create_db);
    }

    #[test]
    fn test_into_config() {
        let config = parse(&["--workers", "8", "--short-query-interval", "0.25"])
            .into_config()
            .expect("config should build");
        assert_eq!(config.load.workers, 8);
        assert_eq!(
            config.load.short_query_interval,
            Duration::from_millis(250)
        );
        assert_eq!(config.database.port, 3306);
        assert!(config.validate_all().is_ok());
    }

    #[test]
    fn test_negative_interval_rejected() {
        let result = parse(&["--short-query-interval=-1"]).into_config();
        assert!(result.is_err());
    }

    #[test]
    fn test_out_of_range_chance_rejected_by_validation() {
        let config = parse(&["--long-query-chance", "1.5"])
            .into_config()
            .expect("config should build");
        assert!(config.validate_all().is_err());
    }

    #[test]
    fn test_missing_required_flag_fails() {
        assert!(Cli::try_parse_from(["faultline", "--host", "h"]).is_err());
    }
}

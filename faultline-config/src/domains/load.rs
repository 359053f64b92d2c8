//! Load shape configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_unit_interval, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Worker pool size and query mix.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Number of concurrent workers
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Approximate pause between short queries (jittered per iteration)
    #[serde(with = "humantime_serde", default = "default_short_query_interval")]
    pub short_query_interval: Duration,

    /// Probability of running the long query instead of the short one
    #[serde(default = "default_long_query_chance")]
    pub long_query_chance: f64,

    /// Duration the long query blocks the server
    #[serde(with = "humantime_serde", default = "default_long_query_duration")]
    pub long_query_duration: Duration,

    /// Delay between worker spawns, to avoid a connection stampede
    #[serde(with = "humantime_serde", default = "default_spawn_stagger")]
    pub spawn_stagger: Duration,

    /// Margin added to the long-query duration when joining workers
    #[serde(with = "humantime_serde", default = "default_join_grace")]
    pub join_grace: Duration,
}

impl LoadConfig {
    /// How long the supervisor waits for each worker at shutdown.
    /// Must exceed the longest legitimate in-flight statement.
    pub fn join_timeout(&self) -> Duration {
        self.long_query_duration + self.join_grace
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            short_query_interval: default_short_query_interval(),
            long_query_chance: default_long_query_chance(),
            long_query_duration: default_long_query_duration(),
            spawn_stagger: default_spawn_stagger(),
            join_grace: default_join_grace(),
        }
    }
}

impl Validatable for LoadConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(self.workers, "workers", self.domain_name())?;
        validate_unit_interval(self.long_query_chance, "long_query_chance", self.domain_name())?;
        // short_query_interval may be zero (no pacing); the long-query
        // duration only needs to be positive when long queries can occur.
        if self.long_query_chance > 0.0 && self.long_query_duration.is_zero() {
            return Err(self.validation_error(
                "long_query_duration must be greater than 0 when long_query_chance is set",
            ));
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "load"
    }
}

fn default_workers() -> usize {
    5
}

fn default_short_query_interval() -> Duration {
    Duration::from_millis(500)
}

fn default_long_query_chance() -> f64 {
    0.1
}

fn default_long_query_duration() -> Duration {
    Duration::from_secs(10)
}

fn default_spawn_stagger() -> Duration {
    Duration::from_millis(100)
}

fn default_join_grace() -> Duration {
    Duration::from_secs(5)
}

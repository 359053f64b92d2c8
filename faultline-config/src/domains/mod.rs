//! Domain-specific configuration modules

pub mod database;
pub mod load;
pub mod logging;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main faultline configuration combining all domains
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultlineConfig {
    /// Target database endpoint
    pub database: database::DatabaseConfig,

    /// Load shape: worker count, query mix, pacing
    #[serde(default)]
    pub load: load::LoadConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,
}

impl FaultlineConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.database.validate()?;
        self.load.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

//! Domain-driven configuration for faultline
//!
//! Configuration is split by functional domain (database endpoint, load
//! shape, logging) with validation and defaults. The binary assembles
//! these structs from CLI flags; there is no config-file layer.

pub mod error;
pub mod validation;

// Domain-specific configuration modules
pub mod domains;

// Re-export main types
pub use error::{ConfigError, ConfigResult};

// Re-export domain configurations
pub use domains::{
    database::DatabaseConfig,
    load::LoadConfig,
    logging::{LogLevel, LoggingConfig},
    FaultlineConfig,
};

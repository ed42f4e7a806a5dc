//! Engine configuration.
//!
//! ```toml
//! dialect = "postgresql"
//! batch_size = 500
//! ```

use serde::Deserialize;

use crate::dialect::Dialect;
use crate::error::ConfigError;

/// Default number of rows fetched per `each_batch` query.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Process-wide settings owned by the schema registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Dialect every relation compiles to.
    pub dialect: Dialect,
    /// Batch size used when `each_batch` is called with 0.
    pub batch_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::SQLite,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl EngineConfig {
    pub const fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Parses a TOML document into a config, rejecting a zero batch size.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid {
                key: "batch_size".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

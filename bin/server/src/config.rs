//! Centralized server configuration.
//!
//! Loaded via the `config` crate from environment variables. Nested keys
//! use `__` as the separator, so `POOL__MAX_CONNECTIONS` sets
//! `pool.max_connections` and `GENERATOR__MAX_DIAGRAM_EDGES` sets
//! `generator.max_diagram_edges`.

use inventory_snippets::GeneratorLimits;
use serde::Deserialize;
use std::collections::HashMap;

/// Server configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// PostgreSQL connection URL for the inventory database.
    pub database_url: String,

    /// Address the HTTP listener binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Connection pool settings.
    #[serde(default)]
    pub pool: PoolConfig,

    /// Output caps for snippet generation.
    #[serde(default)]
    pub generator: GeneratorLimits,
}

/// Connection pool settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    /// Upper bound on open database connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::load(environment())
    }

    /// Loads configuration from an explicit variable map instead of the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, config::ConfigError> {
        Self::load(environment().source(Some(vars)))
    }

    fn load(source: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()
    }
}

fn environment() -> config::Environment {
    config::Environment::default()
        .separator("__")
        .try_parsing(true)
}

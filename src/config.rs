//! Configuration for the listing API.

use serde::{Deserialize, Serialize};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Store configuration for one resource type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database file
    pub path: String,
    /// Rows written by the one-time seed
    #[serde(default = "default_seed_rows")]
    pub seed_rows: u32,
}

fn default_seed_rows() -> u32 {
    100
}

impl StoreConfig {
    fn at(path: &str) -> Self {
        Self {
            path: path.to_string(),
            seed_rows: default_seed_rows(),
        }
    }
}

fn default_racing_store() -> StoreConfig {
    StoreConfig::at("data/racing.db")
}

fn default_sports_store() -> StoreConfig {
    StoreConfig::at("data/sports.db")
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default = "default_racing_store")]
    pub racing: StoreConfig,
    #[serde(default = "default_sports_store")]
    pub sports: StoreConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            racing: default_racing_store(),
            sports: default_sports_store(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and config file
    pub fn load() -> anyhow::Result<Self> {
        Self::load_with(environment())
    }

    fn load_with(env: config::Environment) -> anyhow::Result<Self> {
        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Add config file if exists
            .add_source(config::File::with_name("config").required(false))
            // Override with environment variables
            .add_source(env)
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

/// `LISTING_SERVER__PORT`, `LISTING_RACING__SEED_ROWS`, ...
///
/// Nesting uses `__` so that keys containing `_` stay whole.
fn environment() -> config::Environment {
    config::Environment::with_prefix("LISTING")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

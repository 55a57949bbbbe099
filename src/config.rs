//! Application configuration loaded from environment variables.
//!
//! Every variable carries the `HABITS_` prefix, e.g. `HABITS_PORT=3001`.

use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::store::{HabitStore, IdStrategy};

/// Prefix shared by all configuration variables.
pub const ENV_PREFIX: &str = "HABITS_";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server Configuration ===
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    // === Store Behaviour ===
    /// Id assignment: `count` or `sequence`.
    #[serde(default = "default_id_strategy")]
    pub id_strategy: String,

    /// Answer 404 instead of 200 when deleting from a user without habits.
    #[serde(default)]
    pub strict_not_found: bool,

    /// Start with the Alice and Bob seed users.
    #[serde(default = "default_true")]
    pub seed_users: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_id_strategy() -> String {
    "count".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            id_strategy: default_id_strategy(),
            strict_not_found: false,
            seed_users: true,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> std::result::Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::prefixed(ENV_PREFIX).from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(AppError::InvalidConfig("HABITS_HOST must not be empty".to_string()));
        }

        if self.port == 0 {
            return Err(AppError::InvalidConfig("HABITS_PORT must be non-zero".to_string()));
        }

        self.id_strategy()?;
        Ok(())
    }

    /// Parsed id assignment strategy.
    pub fn id_strategy(&self) -> Result<IdStrategy> {
        self.id_strategy.to_lowercase().parse().map_err(|_| {
            AppError::InvalidConfig(format!(
                "HABITS_ID_STRATEGY must be count or sequence, got {:?}",
                self.id_strategy
            ))
        })
    }

    /// Build the initial store described by this configuration.
    pub fn build_store(&self) -> Result<HabitStore> {
        let ids = self.id_strategy()?;
        Ok(if self.seed_users {
            HabitStore::seeded(ids)
        } else {
            HabitStore::new(ids)
        })
    }
}

//! Configuration Loader
//!
//! Environment-aware loading: defaults, base YAML file, per-environment YAML override,
//! then environment variables. Missing files are skipped; malformed ones fail.

use super::error::ConfigurationError;
use super::{BizcoreConfig, DEFAULT_DATABASE_URL, DEFAULT_DIALECT};
use crate::constants::{env as env_vars, DEFAULT_ENVIRONMENT};
use config::{Config, Environment, File};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

const BASE_FILE: &str = "bizcore.yaml";

#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_directory: PathBuf,
    environment: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Loader for `./config` and the auto-detected environment
    pub fn new() -> Self {
        Self {
            config_directory: PathBuf::from("config"),
            environment: detect_environment(),
        }
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.config_directory = directory.into();
        self
    }

    /// Explicit environment, useful in tests without touching process env vars
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into().to_lowercase();
        self
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Load, merge and validate the configuration.
    pub fn load(&self) -> Result<BizcoreConfig, ConfigurationError> {
        let base_file = self.config_directory.join(BASE_FILE);
        let env_file = self
            .config_directory
            .join(format!("bizcore.{}.yaml", self.environment));

        debug!(
            environment = %self.environment,
            base = %base_file.display(),
            overlay = %env_file.display(),
            "Loading configuration"
        );

        let mut builder = Config::builder()
            .set_default("database.url", DEFAULT_DATABASE_URL)?
            .set_default("database.dialect", DEFAULT_DIALECT)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 0)?
            .set_default("database.acquire_timeout_seconds", 30)?
            .set_default("logging.level", "")?
            .set_default("logging.format", "pretty")?
            .add_source(File::from(base_file).required(false))
            .add_source(File::from(env_file).required(false))
            .add_source(
                Environment::with_prefix(env_vars::CONFIG_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        // The conventional DATABASE_URL applies unless the prefixed variable is set.
        if env::var(format!("{}__DATABASE__URL", env_vars::CONFIG_PREFIX)).is_err() {
            if let Ok(url) = env::var(env_vars::DATABASE_URL) {
                builder = builder.set_override("database.url", url)?;
            }
        }

        let config: BizcoreConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        debug!(
            environment = %self.environment,
            database_url = %config.database.masked_url(),
            dialect = %config.database.dialect,
            max_connections = config.database.max_connections,
            "Configuration loaded"
        );

        Ok(config)
    }
}

/// Current environment from `BIZCORE_ENV`, then `APP_ENV`, defaulting to development.
pub fn detect_environment() -> String {
    env::var(env_vars::BIZCORE_ENV)
        .or_else(|_| env::var(env_vars::APP_ENV))
        .unwrap_or_else(|_| DEFAULT_ENVIRONMENT.to_string())
        .to_lowercase()
}

//! # Configuration
//!
//! Layered configuration for the data-access core, loaded with the `config` crate:
//! built-in defaults, `config/bizcore.yaml`, `config/bizcore.<env>.yaml`, then
//! `BIZCORE__*` environment variables (and `DATABASE_URL`).
//!
//! ```rust,no_run
//! use bizcore::config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new().load()?;
//! let dialect = config.database.dialect()?;
//! println!("rendering SQL for {dialect}");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::database::Backend;
use crate::query_builder::Dialect;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use error::ConfigurationError;
pub use loader::{detect_environment, ConfigLoader};

pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/bizcore_development";
pub const DEFAULT_DIALECT: &str = "postgres";

/// Root configuration structure mirroring `config/bizcore.yaml`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BizcoreConfig {
    /// Database connection, dialect and pooling
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Structured logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BizcoreConfig {
    /// Validate every section; the first failure wins.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.database.validate()?;
        self.logging.validate()
    }
}

/// Database connection and pooling configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    /// `postgres` or `sqlite`; anything else fails at startup
    pub dialect: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            dialect: DEFAULT_DIALECT.to_string(),
            max_connections: 10,
            min_connections: 0,
            acquire_timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// Resolve the configured dialect, failing fast on unknown values.
    pub fn dialect(&self) -> Result<Dialect, ConfigurationError> {
        self.dialect.parse()
    }

    /// Resolve the backend from the URL scheme.
    pub fn backend(&self) -> Result<Backend, ConfigurationError> {
        Backend::from_url(&self.url)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_seconds)
    }

    /// URL with any password replaced, for logs and diagnostics.
    pub fn masked_url(&self) -> String {
        mask_password(&self.url)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let dialect = self.dialect()?;
        let backend = self.backend()?;
        if !dialect.runs_on(backend) {
            return Err(ConfigurationError::DialectBackendMismatch {
                dialect: dialect.to_string(),
                backend: backend.to_string(),
            });
        }

        if self.max_connections == 0 {
            return Err(ConfigurationError::invalid_value(
                "database.max_connections",
                "0",
                "pool size must be greater than 0",
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigurationError::invalid_value(
                "database.min_connections",
                self.min_connections.to_string(),
                "must not exceed database.max_connections",
            ));
        }

        Ok(())
    }
}

/// Console output format for structured logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset; empty means environment default
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::new(),
            format: LogFormat::Pretty,
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.level.is_empty() {
            tracing_subscriber::EnvFilter::try_new(&self.level).map_err(|e| {
                ConfigurationError::invalid_value("logging.level", &self.level, e.to_string())
            })?;
        }
        Ok(())
    }
}

fn mask_password(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((credentials, host)) = rest.split_once('@') else {
        return url.to_string();
    };
    match credentials.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:***@{host}"),
        None => url.to_string(),
    }
}

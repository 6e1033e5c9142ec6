//! Configuration Error Types
//!
//! Errors raised while loading or validating configuration. All of them are fatal:
//! they surface at startup and are never retried.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// The configured dialect is not one of the supported values
    #[error("Unsupported SQL dialect '{value}' (expected 'postgres' or 'sqlite')")]
    UnsupportedDialect { value: String },

    /// The database URL scheme does not name a supported backend
    #[error("Unsupported database backend in URL '{url}'")]
    UnsupportedBackend { url: String },

    /// The dialect renders SQL the backend cannot execute
    #[error("Dialect '{dialect}' cannot run against a {backend} backend")]
    DialectBackendMismatch { dialect: String, backend: String },

    /// Invalid configuration value
    #[error("Invalid value '{value}' for field '{field}': {context}")]
    InvalidValue {
        field: String,
        value: String,
        context: String,
    },

    /// Configuration sources could not be read or deserialized
    #[error("Failed to load configuration: {error}")]
    LoadFailed { error: String },
}

impl ConfigurationError {
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            context: context.into(),
        }
    }
}

impl From<config::ConfigError> for ConfigurationError {
    fn from(err: config::ConfigError) -> Self {
        Self::LoadFailed {
            error: err.to_string(),
        }
    }
}

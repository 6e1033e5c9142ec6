//! Error types for the bizcore data-access layer.
//!
//! Errors fall into three families so callers can map them to user-facing messages:
//!
//! - **Configuration** (fatal, never retried): unsupported dialect, missing
//!   transition-table entry, missing running-number counter.
//! - **Data**: "not found / no-op" (`NotFound`, `NoRowsAffected`) kept apart from
//!   constraint violations (`DuplicateCode`, `ConstraintViolation`), plus workflow
//!   and validation failures.
//! - **Infrastructure**: database driver, row-mapping and async-runtime failures.

use crate::config::ConfigurationError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BizError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("No current running-number counter for object class '{object_class}'")]
    MissingCounter { object_class: String },

    #[error("Running number {number} for '{object_class}' does not fit in {width} digits")]
    CounterExhausted {
        object_class: String,
        number: i64,
        width: usize,
    },

    #[error("No transition defined for action '{action}' on {entity_type}")]
    MissingTransition { entity_type: String, action: String },

    #[error("Action '{action}' is not valid for {entity_type} in status '{status}'")]
    InvalidTransition {
        entity_type: String,
        status: String,
        action: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{entity_type} {key} not found")]
    NotFound { entity_type: String, key: String },

    #[error("No rows affected: {0}")]
    NoRowsAffected(String),

    #[error("Duplicate business code '{code}' for {entity_type}")]
    DuplicateCode { entity_type: String, code: String },

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Row mapping error: {0}")]
    Mapping(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl BizError {
    /// Whether this error stems from configuration rather than data or I/O.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_)
                | Self::MissingCounter { .. }
                | Self::MissingTransition { .. }
                | Self::CounterExhausted { .. }
        )
    }

    /// Whether this error means "nothing there / nothing changed".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::NoRowsAffected(_))
    }

    /// Whether this error is a uniqueness or other constraint violation.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Self::DuplicateCode { .. } | Self::ConstraintViolation(_)
        )
    }

    pub(crate) fn not_found(entity_type: &str, key: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            key: key.to_string(),
        }
    }
}

impl From<sqlx::Error> for BizError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation()
                || db_err.is_foreign_key_violation()
                || db_err.is_check_violation()
            {
                return BizError::ConstraintViolation(db_err.message().to_string());
            }
        }
        BizError::Database(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BizError>;

//! # Structured Logging Module
//!
//! Console logging through `tracing-subscriber`, pretty or JSON, plus structured
//! helpers for repository and workflow events.

use crate::config::{detect_environment, LogFormat, LoggingConfig};
use crate::constants::default_log_level;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Install the global subscriber once per process.
///
/// The filter comes from `RUST_LOG`, then `config.level`, then the environment
/// default. An already-installed global subscriber is left in place.
pub fn init_structured_logging(config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = detect_environment();
        let filter = resolve_filter(config, &environment);

        let layer = match config.format {
            LogFormat::Pretty => fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(true)
                .with_filter(EnvFilter::new(&filter))
                .boxed(),
            LogFormat::Json => fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(EnvFilter::new(&filter))
                .boxed(),
        };

        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized");
        }

        tracing::info!(
            environment = %environment,
            filter = %filter,
            format = ?config.format,
            "Structured logging initialized"
        );
    });
}

fn resolve_filter(config: &LoggingConfig, environment: &str) -> String {
    std::env::var(EnvFilter::DEFAULT_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .or_else(|| (!config.level.trim().is_empty()).then(|| config.level.clone()))
        .unwrap_or_else(|| default_log_level(environment).to_string())
}

/// Log a repository write
pub fn log_repository_operation(
    operation: &str,
    entity_type: &str,
    record_id: Option<i64>,
    status: &str,
) {
    tracing::debug!(
        operation = %operation,
        entity_type = %entity_type,
        record_id = record_id,
        status = %status,
        "REPOSITORY_OPERATION"
    );
}

/// Log a committed workflow transition
pub fn log_workflow_transition(
    entity_type: &str,
    entity_id: i64,
    action: &str,
    from_status: &str,
    to_status: &str,
    user_id: i64,
) {
    tracing::info!(
        entity_type = %entity_type,
        entity_id = entity_id,
        action = %action,
        from_status = %from_status,
        to_status = %to_status,
        user_id = user_id,
        "WORKFLOW_TRANSITION"
    );
}

use crate::config::{ConfigurationError, DatabaseConfig};
use crate::error::Result;
use crate::query_builder::Dialect;
use serde::{Deserialize, Serialize};
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::pool::PoolConnection;
use sqlx::{Any, AnyPool, Row, Transaction};
use std::fmt;
use tracing::{debug, info, warn};

/// Database engine behind the pool, derived from the URL scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Postgres,
    Sqlite,
}

impl Backend {
    pub fn from_url(url: &str) -> std::result::Result<Self, ConfigurationError> {
        let scheme = url.split_once(':').map(|(scheme, _)| scheme.to_lowercase());
        match scheme.as_deref() {
            Some("postgres" | "postgresql") => Ok(Backend::Postgres),
            Some("sqlite") => Ok(Backend::Sqlite),
            _ => Err(ConfigurationError::UnsupportedBackend {
                url: url.split('@').next_back().unwrap_or(url).to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Postgres => "postgres",
            Backend::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pooled connection provider carrying the dialect used to render SQL for it.
#[derive(Debug, Clone)]
pub struct DatabaseConnection {
    pool: AnyPool,
    dialect: Dialect,
    backend: Backend,
}

impl DatabaseConnection {
    /// Validate `config` and open a pool.
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self> {
        config.validate()?;
        let dialect = config.dialect()?;
        let backend = config.backend()?;

        sqlx::any::install_default_drivers();
        let pool = AnyPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect(&config.url)
            .await?;

        info!(
            database_url = %config.masked_url(),
            dialect = %dialect,
            backend = %backend,
            max_connections = config.max_connections,
            "Database pool ready"
        );

        Ok(Self {
            pool,
            dialect,
            backend,
        })
    }

    /// Open a pool for `url` with default pool settings.
    pub async fn connect(url: &str, dialect: Dialect) -> Result<Self> {
        let config = DatabaseConfig {
            url: url.to_string(),
            dialect: dialect.to_string(),
            ..DatabaseConfig::default()
        };
        Self::from_config(&config).await
    }

    /// Wrap an existing pool. The dialect must be executable on the backend.
    pub fn from_pool(pool: AnyPool, dialect: Dialect, backend: Backend) -> Result<Self> {
        if !dialect.runs_on(backend) {
            return Err(ConfigurationError::DialectBackendMismatch {
                dialect: dialect.to_string(),
                backend: backend.to_string(),
            }
            .into());
        }
        Ok(Self {
            pool,
            dialect,
            backend,
        })
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Scoped connection, returned to the pool on drop.
    pub async fn acquire(&self) -> Result<PoolConnection<Any>> {
        Ok(self.pool.acquire().await?)
    }

    /// Begin a transaction; dropping it without commit rolls back.
    pub async fn begin(&self) -> Result<Transaction<'static, Any>> {
        debug!(dialect = %self.dialect, "Beginning transaction");
        Ok(self.pool.begin().await?)
    }

    pub async fn health_check(&self) -> Result<bool> {
        let row: AnyRow = sqlx::query("SELECT 1 AS health")
            .fetch_one(&self.pool)
            .await?;
        let health = row
            .try_get::<i64, _>(0)
            .or_else(|_| row.try_get::<i32, _>(0).map(i64::from))?;
        Ok(health == 1)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Commit on success; on failure roll back, log a rollback failure and return the
/// original error.
pub async fn finish_transaction<T>(
    tx: Transaction<'static, Any>,
    result: Result<T>,
    operation: &str,
) -> Result<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            warn!(operation = %operation, error = %err, "Rolling back transaction");
            if let Err(rollback_err) = tx.rollback().await {
                warn!(operation = %operation, error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

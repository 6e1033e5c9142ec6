//! # Database Operations
//!
//! Connection pooling and schema helpers over `sqlx::AnyPool`.
//!
//! ## Key Components
//!
//! - [`connection`] - [`DatabaseConnection`]: pool, dialect and [`Backend`]
//! - [`migrations`] - idempotent DDL for core and entity tables
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use bizcore::database::{DatabaseConnection, DatabaseMigrations};
//! use bizcore::query_builder::Dialect;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = DatabaseConnection::connect("sqlite://bizcore.db?mode=rwc", Dialect::Sqlite).await?;
//! DatabaseMigrations::run_core(&db).await?;
//! assert!(db.health_check().await?);
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod migrations;

pub use connection::{finish_transaction, Backend, DatabaseConnection};
pub use migrations::DatabaseMigrations;

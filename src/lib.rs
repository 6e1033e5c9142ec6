#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # bizcore
//!
//! Dialect-portable data-access core for line-of-business applications.
//!
//! ## Overview
//!
//! One entity definition works against PostgreSQL (snake_case identifiers, `$n`
//! parameters, `LIMIT/OFFSET`) and a capitalized-identifier dialect with window-function
//! paging, rendered for SQLite. On top of the query builder sit a generic repository
//! with soft delete and audit stamping, an atomic running-number allocator for business
//! codes, and a workflow engine that saves an entity, moves it to its next status and
//! writes the history row in a single transaction.
//!
//! ## Module Organization
//!
//! - [`query_builder`] - dialect-aware SELECT/COUNT/INSERT/UPDATE rendering
//! - [`models`] - entity descriptors, audit fields, running-number and trail rows
//! - [`repository`] - [`GenericRepository`] CRUD, search, paging, quick search
//! - [`running_number`] - business-code allocation and reservations
//! - [`workflow`] - [`WorkflowTransitionEngine`], transition tables, acting user
//! - [`database`] - pool, backend detection, schema creation
//! - [`blocking`] - synchronous wrappers over the async API
//! - [`config`] / [`logging`] / [`error`] - ambient plumbing
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bizcore::config::ConfigLoader;
//! use bizcore::database::{DatabaseConnection, DatabaseMigrations};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new().load()?;
//! bizcore::logging::init_structured_logging(&config.logging);
//!
//! let db = DatabaseConnection::from_config(&config.database).await?;
//! DatabaseMigrations::run_core(&db).await?;
//! println!("connected with {} dialect", db.dialect());
//! # Ok(())
//! # }
//! ```

pub mod blocking;
pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod logging;
pub mod models;
pub mod query_builder;
pub mod repository;
pub mod running_number;
pub mod workflow;

pub use config::{BizcoreConfig, ConfigLoader, DatabaseConfig, LoggingConfig};
pub use database::{Backend, DatabaseConnection, DatabaseMigrations};
pub use error::{BizError, Result};
pub use models::{Entity, WorkflowEntity};
pub use query_builder::{Dialect, Page, Pagination, QueryBuilder};
pub use repository::{GenericRepository, QuickSearchCommand, SearchCriteria};
pub use running_number::RunningNumberAllocator;
pub use workflow::{
    SessionUser, StaticTransitionTable, TransitionOutcome, TransitionTable, UserContext,
    WorkflowTransitionEngine,
};

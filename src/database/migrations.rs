//! # Schema Helpers
//!
//! Idempotent DDL for the core tables and for entity tables described by [`Entity`].
//!
//! Identifier naming follows the dialect; column types follow the backend:
//!
//! | kind | postgres | sqlite |
//! |---|---|---|
//! | id | `BIGSERIAL PRIMARY KEY` | `INTEGER PRIMARY KEY AUTOINCREMENT` |
//! | big int | `BIGINT` | `INTEGER` |
//! | bool | `BOOLEAN` | `INTEGER` (0/1) |
//! | float | `DOUBLE PRECISION` | `REAL` |
//! | text / timestamp | `TEXT` | `TEXT` |
//!
//! Every entity table gets a partial unique index on the folded `ObjectCode` of live
//! rows; the counter table gets one on `GeneratorId` of current rows.

use super::{Backend, DatabaseConnection};
use crate::error::Result;
use crate::models::{
    AppendOnlyRecord, ColumnDef, Entity, ObjectStatusAuditTrail, RunningNumberCounter,
    RunningNumberGenerator, WorkflowHistory,
};
use crate::models::audit::AUDIT_COLUMNS;
use crate::query_builder::{ColumnKind, Dialect, TableDescriptor};
use tracing::{debug, info};

/// Idempotent schema creation.
pub struct DatabaseMigrations;

impl DatabaseMigrations {
    /// Create the running-number and history tables.
    pub async fn run_core(db: &DatabaseConnection) -> Result<()> {
        Self::create_entity_table::<RunningNumberGenerator>(db).await?;
        Self::create_entity_table::<RunningNumberCounter>(db).await?;
        Self::create_record_table::<WorkflowHistory>(db).await?;
        Self::create_record_table::<ObjectStatusAuditTrail>(db).await?;
        Self::execute_all(db, &[current_counter_index(db.dialect())]).await?;
        info!(dialect = %db.dialect(), backend = %db.backend(), "Core schema ready");
        Ok(())
    }

    /// Create the table and business-code index of one entity type.
    pub async fn create_entity_table<E: Entity>(db: &DatabaseConnection) -> Result<()> {
        let statements = entity_table_statements(
            db.dialect(),
            db.backend(),
            &E::TABLE,
            E::columns(),
        );
        Self::execute_all(db, &statements).await
    }

    /// Create an append-only record table plus its object lookup index.
    pub async fn create_record_table<R: AppendOnlyRecord>(db: &DatabaseConnection) -> Result<()> {
        let statements = record_table_statements(db.dialect(), db.backend(), &R::TABLE, R::columns());
        Self::execute_all(db, &statements).await
    }

    async fn execute_all(db: &DatabaseConnection, statements: &[String]) -> Result<()> {
        for statement in statements {
            debug!(sql = %statement, "Executing DDL");
            sqlx::query(statement).execute(db.pool()).await?;
        }
        Ok(())
    }
}

/// Name of the business-code index, as it appears in constraint messages.
pub fn code_index_name(dialect: Dialect, table: &TableDescriptor) -> String {
    dialect.label(&format!("UX_{}_ObjectCode", table.logical))
}

/// `CREATE TABLE` + code index for an entity type
pub fn entity_table_statements(
    dialect: Dialect,
    backend: Backend,
    table: &TableDescriptor,
    columns: &[ColumnDef],
) -> Vec<String> {
    let definitions: Vec<String> = AUDIT_COLUMNS
        .iter()
        .chain(columns)
        .map(|column| column_definition(dialect, backend, column))
        .collect();

    let table_name = dialect.table_name(table);
    vec![
        format!(
            "CREATE TABLE IF NOT EXISTS {table_name} ({})",
            definitions.join(", ")
        ),
        format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {table_name} ({}) WHERE {} = {}",
            dialect.ident(&format!("UX_{}_ObjectCode", table.logical)),
            dialect.fold(&dialect.ident("ObjectCode")),
            dialect.ident("IsDeleted"),
            dialect.bool_literal(false)
        ),
    ]
}

/// `CREATE TABLE` + `(ObjectType, ObjectId)` index for an append-only record
pub fn record_table_statements(
    dialect: Dialect,
    backend: Backend,
    table: &TableDescriptor,
    columns: &[ColumnDef],
) -> Vec<String> {
    let id = ColumnDef::required("Id", ColumnKind::BigInt);
    let definitions: Vec<String> = std::iter::once(&id)
        .chain(columns)
        .map(|column| column_definition(dialect, backend, column))
        .collect();

    let table_name = dialect.table_name(table);
    vec![
        format!(
            "CREATE TABLE IF NOT EXISTS {table_name} ({})",
            definitions.join(", ")
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {table_name} ({}, {})",
            dialect.ident(&format!("IX_{}_Object", table.logical)),
            dialect.ident("ObjectType"),
            dialect.ident("ObjectId")
        ),
    ]
}

fn current_counter_index(dialect: Dialect) -> String {
    format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} ({}) WHERE {} = {} AND {} = {}",
        dialect.ident("UX_RunningNumberCounter_Current"),
        dialect.table_name(&RunningNumberCounter::TABLE),
        dialect.ident("GeneratorId"),
        dialect.ident("IsCurrent"),
        dialect.bool_literal(true),
        dialect.ident("IsDeleted"),
        dialect.bool_literal(false)
    )
}

fn column_definition(dialect: Dialect, backend: Backend, column: &ColumnDef) -> String {
    let name = dialect.ident(column.name);
    if column.name == "Id" {
        return match backend {
            Backend::Postgres => format!("{name} BIGSERIAL PRIMARY KEY"),
            Backend::Sqlite => format!("{name} INTEGER PRIMARY KEY AUTOINCREMENT"),
        };
    }

    let sql_type = match (backend, column.kind) {
        (Backend::Postgres, ColumnKind::BigInt) => "BIGINT",
        (Backend::Sqlite, ColumnKind::BigInt) => "INTEGER",
        (Backend::Postgres, ColumnKind::Bool) => "BOOLEAN",
        // The Any driver cannot decode SQLite's BOOLEAN affinity; TRUE/FALSE are 1/0.
        (Backend::Sqlite, ColumnKind::Bool) => "INTEGER",
        (Backend::Postgres, ColumnKind::Float) => "DOUBLE PRECISION",
        (Backend::Sqlite, ColumnKind::Float) => "REAL",
        (_, ColumnKind::Text | ColumnKind::Timestamp) => "TEXT",
    };

    match (column.nullable, column.kind) {
        (true, _) => format!("{name} {sql_type}"),
        (false, ColumnKind::Bool) => format!(
            "{name} {sql_type} NOT NULL DEFAULT {}",
            dialect.bool_literal(false)
        ),
        (false, _) => format!("{name} {sql_type} NOT NULL"),
    }
}

//! # Entity Descriptors
//!
//! Static description of a persisted type: its table, columns, eager-loaded
//! associations and how it converts to and from rows. The repository, schema helpers
//! and workflow engine are all generic over [`Entity`].

use super::audit::{AuditFields, AUDIT_COLUMNS};
use super::row::RowReader;
use crate::error::Result;
use crate::query_builder::{ColumnKind, Join, SqlValue, TableDescriptor};

/// One physical column, by logical name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
}

impl ColumnDef {
    pub const fn required(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
        }
    }

    pub const fn optional(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            nullable: true,
        }
    }
}

/// Many-to-one association loaded with a LEFT JOIN on `alias.Id = t.<foreign_key>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Association {
    pub alias: &'static str,
    pub table: TableDescriptor,
    pub foreign_key: &'static str,
    pub columns: &'static [&'static str],
}

impl Association {
    pub fn to_join(&self) -> Join {
        Join::left(self.table, self.alias, self.foreign_key, self.columns)
    }
}

/// A persisted business type carrying [`AuditFields`].
///
/// `columns()` lists the type's own columns (audit columns are implicit) and `values()`
/// returns them in the same order.
pub trait Entity: Clone + Send + Sync + Unpin + 'static {
    /// Object type / class name, also the running-number class
    const OBJECT_TYPE: &'static str;
    const TABLE: TableDescriptor;

    fn columns() -> &'static [ColumnDef];

    fn values(&self) -> Vec<SqlValue>;

    fn from_row(row: &RowReader<'_>) -> Result<Self>;

    fn audit(&self) -> &AuditFields;

    fn audit_mut(&mut self) -> &mut AuditFields;

    fn associations() -> &'static [Association] {
        &[]
    }

    fn id(&self) -> Option<i64> {
        self.audit().id
    }

    /// Audit columns followed by the type's own columns
    fn select_columns() -> Vec<&'static str> {
        AUDIT_COLUMNS
            .iter()
            .chain(Self::columns())
            .map(|column| column.name)
            .collect()
    }
}

/// Append-only record without audit columns or soft delete (history tables).
pub trait AppendOnlyRecord: Sized + Send + Sync + 'static {
    const TABLE: TableDescriptor;

    /// Columns excluding `Id`
    fn columns() -> &'static [ColumnDef];

    fn values(&self) -> Vec<SqlValue>;

    fn from_row(row: &RowReader<'_>) -> Result<Self>;

    fn column_names() -> Vec<&'static str> {
        Self::columns().iter().map(|column| column.name).collect()
    }
}

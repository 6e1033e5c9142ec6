use super::soft_delete::not_deleted;
use super::{Dialect, TableDescriptor};

/// Represents different types of SQL JOINs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
}

impl JoinType {
    pub fn to_sql(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
        }
    }
}

/// An eager-loaded many-to-one association: `alias.Id = <base>.<foreign_key>`, filtered
/// by the joined row's own soft-delete flag. Selected columns come back as
/// `<alias>_<column>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub join_type: JoinType,
    pub table: TableDescriptor,
    pub alias: String,
    pub foreign_key: String,
    pub columns: Vec<String>,
}

impl Join {
    /// Create a LEFT JOIN; the base row is kept when the association is missing or deleted
    pub fn left(table: TableDescriptor, alias: &str, foreign_key: &str, columns: &[&str]) -> Self {
        Self {
            join_type: JoinType::Left,
            table,
            alias: alias.to_string(),
            foreign_key: foreign_key.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Create an INNER JOIN; base rows without a live association drop out
    pub fn inner(table: TableDescriptor, alias: &str, foreign_key: &str, columns: &[&str]) -> Self {
        Self {
            join_type: JoinType::Inner,
            ..Self::left(table, alias, foreign_key, columns)
        }
    }

    /// Convert to SQL string
    pub fn to_sql(&self, dialect: Dialect, base_alias: &str) -> String {
        format!(
            "{} {} {} ON {} = {} AND {}",
            self.join_type.to_sql(),
            dialect.table_name(&self.table),
            dialect.alias(&self.alias),
            dialect.qualified(&self.alias, "Id"),
            dialect.qualified(base_alias, &self.foreign_key),
            not_deleted(dialect, &self.alias)
        )
    }

    /// `alias.Column AS alias_Column` entries for the select list.
    pub fn select_columns(&self, dialect: Dialect) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| {
                format!(
                    "{} AS {}",
                    dialect.qualified(&self.alias, column),
                    dialect.joined_ident(&self.alias, column)
                )
            })
            .collect()
    }
}

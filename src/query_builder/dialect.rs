//! # SQL Dialects
//!
//! Every dialect-specific rendering decision lives here. Callers work with *logical*
//! PascalCase names (`ObjectCode`, `Venue.ObjectName`); the dialect turns them into
//! physical identifiers, placeholders, case-folding calls and paging syntax.
//!
//! | | `postgres` | `sqlite` |
//! |---|---|---|
//! | identifiers | `object_code` | `"ObjectCode"` |
//! | placeholders | `$1, $2, ...` | `?` |
//! | case folding | `LOWER(..)` | `UPPER(..)` |
//! | paging | `LIMIT n OFFSET m` | `ROW_NUMBER() OVER (..)` window |

use crate::config::ConfigurationError;
use crate::database::Backend;
use crate::error::{BizError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Row-number column added by window paging
pub const ROW_NUMBER_COLUMN: &str = "RowNum";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// snake_case identifiers, numbered placeholders, LIMIT/OFFSET paging
    Postgres,
    /// Capitalized quoted identifiers, positional placeholders, window paging
    Sqlite,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite",
        }
    }

    /// Whether SQL rendered in this dialect executes on the given backend.
    ///
    /// SQLite accepts `$N` placeholders and snake_case names, so the Postgres dialect
    /// runs on both backends. Postgres folds unquoted names and rejects `?`, so the
    /// SQLite dialect only runs on SQLite.
    pub fn runs_on(&self, backend: Backend) -> bool {
        match self {
            Dialect::Postgres => true,
            Dialect::Sqlite => backend == Backend::Sqlite,
        }
    }

    /// Placeholder for the 1-based parameter `index`.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${index}"),
            Dialect::Sqlite => "?".to_string(),
        }
    }

    /// Unquoted physical name, as reported back in result-set column labels.
    pub fn label(&self, logical: &str) -> String {
        match self {
            Dialect::Postgres => to_snake_case(logical),
            Dialect::Sqlite => logical.to_string(),
        }
    }

    /// Physical identifier ready for interpolation.
    pub fn ident(&self, logical: &str) -> String {
        match self {
            Dialect::Postgres => to_snake_case(logical),
            Dialect::Sqlite => format!("\"{logical}\""),
        }
    }

    /// Table alias; aliases are never quoted.
    pub fn alias(&self, alias: &str) -> String {
        match self {
            Dialect::Postgres => to_snake_case(alias),
            Dialect::Sqlite => alias.to_string(),
        }
    }

    /// `alias.column` with both parts converted.
    pub fn qualified(&self, alias: &str, column: &str) -> String {
        format!("{}.{}", self.alias(alias), self.ident(column))
    }

    /// Resolve a caller-supplied column reference: `Column` is qualified with
    /// `default_alias`, `Alias.Column` keeps its alias. Invalid identifiers are rejected.
    pub fn column_ref(&self, reference: &str, default_alias: &str) -> Result<String> {
        validate_reference(reference)?;
        Ok(match reference.split_once('.') {
            Some((alias, column)) => self.qualified(alias, column),
            None => self.qualified(default_alias, reference),
        })
    }

    /// Output alias of an eager-loaded column: `<alias>_<column>`.
    pub fn joined_label(&self, alias: &str, column: &str) -> String {
        self.label(&format!("{alias}_{column}"))
    }

    pub fn joined_ident(&self, alias: &str, column: &str) -> String {
        self.ident(&format!("{alias}_{column}"))
    }

    pub fn table_name(&self, table: &TableDescriptor) -> String {
        let name = match self {
            Dialect::Postgres => table
                .postgres_name
                .map(str::to_string)
                .unwrap_or_else(|| to_snake_case(table.logical)),
            Dialect::Sqlite => format!("\"{}\"", table.logical),
        };
        match table.schema {
            Some(schema) => format!("{}.{}", self.ident(schema), name),
            None => name,
        }
    }

    /// Wrap an SQL expression in the dialect's case-folding function. Applied to the
    /// column and to the bound value alike; values are never folded in Rust.
    pub fn fold(&self, expression: &str) -> String {
        match self {
            Dialect::Postgres => format!("LOWER({expression})"),
            Dialect::Sqlite => format!("UPPER({expression})"),
        }
    }

    pub fn bool_literal(&self, value: bool) -> &'static str {
        if value {
            "TRUE"
        } else {
            "FALSE"
        }
    }

    /// Apply a page window to an assembled query.
    ///
    /// `select_list`, `from_where` and `order_by` are the rendered pieces of the
    /// unpaged query (`from_where` starts with `FROM`). `window` is `(offset, size)`.
    pub fn paginate(
        &self,
        select_list: &str,
        from_where: &str,
        order_by: &str,
        window: Option<(u64, u64)>,
    ) -> String {
        match (self, window) {
            (_, None) => format!("SELECT {select_list} {from_where} ORDER BY {order_by}"),
            (Dialect::Postgres, Some((offset, size))) => format!(
                "SELECT {select_list} {from_where} ORDER BY {order_by} LIMIT {size} OFFSET {offset}"
            ),
            (Dialect::Sqlite, Some((offset, size))) => {
                let row_number = self.ident(ROW_NUMBER_COLUMN);
                format!(
                    "SELECT * FROM (SELECT {select_list}, ROW_NUMBER() OVER (ORDER BY {order_by}) AS {row_number} {from_where}) \"Paged\" WHERE {row_number} BETWEEN {} AND {} ORDER BY {row_number}",
                    offset + 1,
                    offset + size
                )
            }
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "sqlite" => Ok(Dialect::Sqlite),
            _ => Err(ConfigurationError::UnsupportedDialect {
                value: value.to_string(),
            }),
        }
    }
}

/// Table identity for one entity type: logical PascalCase name, optional schema and an
/// optional explicit Postgres name when the snake_case conversion is not wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDescriptor {
    pub schema: Option<&'static str>,
    pub logical: &'static str,
    pub postgres_name: Option<&'static str>,
}

impl TableDescriptor {
    pub const fn new(logical: &'static str) -> Self {
        Self {
            schema: None,
            logical,
            postgres_name: None,
        }
    }

    pub const fn with_schema(mut self, schema: &'static str) -> Self {
        self.schema = Some(schema);
        self
    }

    pub const fn with_postgres_name(mut self, name: &'static str) -> Self {
        self.postgres_name = Some(name);
        self
    }
}

/// Convert a logical PascalCase name into snake_case, keeping acronyms together:
/// `ObjectCode` → `object_code`, `HTTPStatus` → `http_status`.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let boundary = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower);
            if boundary && prev != '_' {
                out.push('_');
            }
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Accept `Column` or `Alias.Column`.
pub fn validate_reference(reference: &str) -> Result<()> {
    let valid = match reference.split_once('.') {
        Some((alias, column)) => is_valid_identifier(alias) && is_valid_identifier(column),
        None => is_valid_identifier(reference),
    };
    if valid {
        Ok(())
    } else {
        Err(BizError::Validation(format!(
            "invalid column reference '{reference}'"
        )))
    }
}

//! Write statements rendered per dialect.

use super::params::{BuiltQuery, ParamBag, SqlValue};
use super::soft_delete::IS_DELETED;
use super::{Dialect, TableDescriptor};
use crate::error::{BizError, Result};

/// `INSERT INTO <table> (..) VALUES (..) RETURNING Id`
pub fn insert(
    dialect: Dialect,
    table: &TableDescriptor,
    columns: &[&str],
    values: Vec<SqlValue>,
) -> Result<BuiltQuery> {
    check_arity(table, columns, &values)?;
    let mut params = ParamBag::new(dialect);
    let column_list = columns
        .iter()
        .map(|c| dialect.ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = values
        .into_iter()
        .map(|v| params.push(v))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {} ({column_list}) VALUES ({placeholders}) RETURNING {}",
        dialect.table_name(table),
        dialect.ident("Id")
    );
    Ok(BuiltQuery::new(sql, params))
}

/// `UPDATE <table> SET .. WHERE Id = ? AND IsDeleted = FALSE`
pub fn update_by_id(
    dialect: Dialect,
    table: &TableDescriptor,
    columns: &[&str],
    values: Vec<SqlValue>,
    id: i64,
) -> Result<BuiltQuery> {
    check_arity(table, columns, &values)?;
    if columns.is_empty() {
        return Err(BizError::Validation(format!(
            "update of {} without columns",
            table.logical
        )));
    }
    let mut params = ParamBag::new(dialect);
    let assignments = columns
        .iter()
        .zip(values)
        .map(|(column, value)| format!("{} = {}", dialect.ident(column), params.push(value)))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {} SET {assignments} WHERE {} = {} AND {} = {}",
        dialect.table_name(table),
        dialect.ident("Id"),
        params.push(SqlValue::Int(id)),
        dialect.ident(IS_DELETED),
        dialect.bool_literal(false)
    );
    Ok(BuiltQuery::new(sql, params))
}

/// Physical delete, regardless of the soft-delete flag.
pub fn delete_by_id(dialect: Dialect, table: &TableDescriptor, id: i64) -> BuiltQuery {
    let mut params = ParamBag::new(dialect);
    let sql = format!(
        "DELETE FROM {} WHERE {} = {}",
        dialect.table_name(table),
        dialect.ident("Id"),
        params.push(SqlValue::Int(id))
    );
    BuiltQuery::new(sql, params)
}

fn check_arity(table: &TableDescriptor, columns: &[&str], values: &[SqlValue]) -> Result<()> {
    if columns.len() == values.len() {
        Ok(())
    } else {
        Err(BizError::Mapping(format!(
            "{}: {} columns but {} values",
            table.logical,
            columns.len(),
            values.len()
        )))
    }
}

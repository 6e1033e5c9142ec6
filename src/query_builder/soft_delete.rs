//! Soft-delete convention: rows are marked inactive through `IsDeleted`, never removed
//! by ordinary operations.

use super::params::{BuiltQuery, ParamBag, SqlValue};
use super::{Dialect, TableDescriptor};
use chrono::NaiveDateTime;

pub const IS_DELETED: &str = "IsDeleted";

/// `<alias>.IsDeleted = FALSE`
pub fn not_deleted(dialect: Dialect, alias: &str) -> String {
    format!(
        "{} = {}",
        dialect.qualified(alias, IS_DELETED),
        dialect.bool_literal(false)
    )
}

/// Mark one live row deleted and stamp the modifier.
pub fn mark_deleted(
    dialect: Dialect,
    table: &TableDescriptor,
    id: i64,
    modified_by: i64,
    modified_at: NaiveDateTime,
) -> BuiltQuery {
    let mut params = ParamBag::new(dialect);
    let sql = format!(
        "UPDATE {} SET {} = {}, {} = {}, {} = {} WHERE {} = {} AND {} = {}",
        dialect.table_name(table),
        dialect.ident(IS_DELETED),
        dialect.bool_literal(true),
        dialect.ident("ModifiedBy"),
        params.push(SqlValue::Int(modified_by)),
        dialect.ident("ModifiedAt"),
        params.push(SqlValue::timestamp(modified_at)),
        dialect.ident("Id"),
        params.push(SqlValue::Int(id)),
        dialect.ident(IS_DELETED),
        dialect.bool_literal(false),
    );
    BuiltQuery::new(sql, params)
}

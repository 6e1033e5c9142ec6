//! Row decoding by logical column name.
//!
//! The `Any` driver reports column types as the backend declared them, so integer and
//! boolean reads fall back across the representations SQLite and Postgres hand back.

use super::audit::{parse_timestamp, AuditFields};
use crate::error::{BizError, Result};
use crate::query_builder::Dialect;
use chrono::NaiveDateTime;
use sqlx::any::AnyRow;
use sqlx::Row;

pub struct RowReader<'r> {
    row: &'r AnyRow,
    dialect: Dialect,
    prefix: Option<&'r str>,
}

impl<'r> RowReader<'r> {
    pub fn new(row: &'r AnyRow, dialect: Dialect) -> Self {
        Self {
            row,
            dialect,
            prefix: None,
        }
    }

    /// Reader for the columns an association was selected under (`<alias>_<column>`).
    pub fn joined(&self, alias: &'r str) -> RowReader<'r> {
        RowReader {
            row: self.row,
            dialect: self.dialect,
            prefix: Some(alias),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn label(&self, column: &str) -> String {
        match self.prefix {
            Some(alias) => self.dialect.joined_label(alias, column),
            None => self.dialect.label(column),
        }
    }

    pub fn opt_i64(&self, column: &str) -> Result<Option<i64>> {
        let label = self.label(column);
        match self.row.try_get::<Option<i64>, _>(label.as_str()) {
            Ok(value) => Ok(value),
            Err(err) => self
                .row
                .try_get::<Option<i32>, _>(label.as_str())
                .map(|value| value.map(i64::from))
                .map_err(|_| mapping_error(&label, err)),
        }
    }

    pub fn i64(&self, column: &str) -> Result<i64> {
        self.opt_i64(column)?.ok_or_else(|| null_error(&self.label(column)))
    }

    pub fn opt_bool(&self, column: &str) -> Result<Option<bool>> {
        let label = self.label(column);
        match self.row.try_get::<Option<bool>, _>(label.as_str()) {
            Ok(value) => Ok(value),
            Err(err) => self
                .row
                .try_get::<Option<i64>, _>(label.as_str())
                .map(|value| value.map(|v| v != 0))
                .map_err(|_| mapping_error(&label, err)),
        }
    }

    pub fn bool(&self, column: &str) -> Result<bool> {
        self.opt_bool(column)?.ok_or_else(|| null_error(&self.label(column)))
    }

    pub fn opt_f64(&self, column: &str) -> Result<Option<f64>> {
        let label = self.label(column);
        match self.row.try_get::<Option<f64>, _>(label.as_str()) {
            Ok(value) => Ok(value),
            Err(err) => self
                .row
                .try_get::<Option<i64>, _>(label.as_str())
                .map(|value| value.map(|v| v as f64))
                .map_err(|_| mapping_error(&label, err)),
        }
    }

    pub fn opt_string(&self, column: &str) -> Result<Option<String>> {
        let label = self.label(column);
        self.row
            .try_get::<Option<String>, _>(label.as_str())
            .map_err(|err| mapping_error(&label, err))
    }

    pub fn string(&self, column: &str) -> Result<String> {
        self.opt_string(column)?
            .ok_or_else(|| null_error(&self.label(column)))
    }

    pub fn opt_timestamp(&self, column: &str) -> Result<Option<NaiveDateTime>> {
        self.opt_string(column)?
            .map(|text| parse_timestamp(&text))
            .transpose()
    }

    /// Decode the standard audit columns.
    pub fn audit_fields(&self) -> Result<AuditFields> {
        Ok(AuditFields {
            id: Some(self.i64("Id")?),
            is_deleted: self.opt_bool("IsDeleted")?.unwrap_or(false),
            created_by: self.opt_i64("CreatedBy")?,
            created_at: self.opt_timestamp("CreatedAt")?,
            modified_by: self.opt_i64("ModifiedBy")?,
            modified_at: self.opt_timestamp("ModifiedAt")?,
            object_code: self.opt_string("ObjectCode")?,
            object_name: self.opt_string("ObjectName")?,
        })
    }
}

fn mapping_error(label: &str, err: sqlx::Error) -> BizError {
    BizError::Mapping(format!("column '{label}': {err}"))
}

fn null_error(label: &str) -> BizError {
    BizError::Mapping(format!("column '{label}' is NULL"))
}

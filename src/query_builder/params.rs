//! Parameter bag and typed binding.
//!
//! Values never reach SQL text: rendering pushes them into a [`ParamBag`] and
//! interpolates only the dialect's placeholder.

use super::Dialect;
use crate::error::{BizError, Result};
use chrono::NaiveDateTime;
use sqlx::any::AnyArguments;
use sqlx::query::Query;
use sqlx::Any;

/// Text format used for timestamp columns on every backend
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Storage class of a column; drives DDL types and typed NULL binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    BigInt,
    Bool,
    Float,
    Text,
    Timestamp,
}

/// A bound SQL parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null(ColumnKind),
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null(_))
    }

    pub fn text(value: impl Into<String>) -> Self {
        SqlValue::Text(value.into())
    }

    pub fn timestamp(value: NaiveDateTime) -> Self {
        SqlValue::Text(value.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn opt_int(value: Option<i64>) -> Self {
        value.map_or(SqlValue::Null(ColumnKind::BigInt), SqlValue::Int)
    }

    pub fn opt_text(value: Option<&str>) -> Self {
        value.map_or(SqlValue::Null(ColumnKind::Text), |v| {
            SqlValue::Text(v.to_string())
        })
    }

    pub fn opt_timestamp(value: Option<NaiveDateTime>) -> Self {
        value.map_or(SqlValue::Null(ColumnKind::Timestamp), SqlValue::timestamp)
    }

    pub fn opt_float(value: Option<f64>) -> Self {
        value.map_or(SqlValue::Null(ColumnKind::Float), SqlValue::Float)
    }

    /// Convert a JSON directive value. Arrays and objects have no column mapping.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Null => Ok(SqlValue::Null(ColumnKind::Text)),
            serde_json::Value::Bool(b) => Ok(SqlValue::Bool(*b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(SqlValue::Int(i)),
                None => n.as_f64().map(SqlValue::Float).ok_or_else(|| {
                    BizError::Validation(format!("numeric value {n} is out of range"))
                }),
            },
            serde_json::Value::String(s) => Ok(SqlValue::Text(s.clone())),
            other => Err(BizError::Validation(format!(
                "unsupported filter value {other}"
            ))),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(i64::from(value))
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(value: NaiveDateTime) -> Self {
        SqlValue::timestamp(value)
    }
}

/// Ordered parameter list collected while rendering one statement.
#[derive(Debug, Clone)]
pub struct ParamBag {
    dialect: Dialect,
    values: Vec<SqlValue>,
}

impl ParamBag {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            values: Vec::new(),
        }
    }

    /// Store a value and return the placeholder that refers to it.
    pub fn push(&mut self, value: SqlValue) -> String {
        self.values.push(value);
        self.dialect.placeholder(self.values.len())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }
}

/// Rendered SQL text plus its parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl BuiltQuery {
    pub fn new(sql: String, params: ParamBag) -> Self {
        Self {
            sql,
            params: params.into_values(),
        }
    }

    /// Prepare an executable query with every parameter bound.
    pub fn query(&self) -> Query<'_, Any, AnyArguments<'_>> {
        self.params
            .iter()
            .fold(sqlx::query::<Any>(&self.sql), |query, value| {
                bind_value(query, value)
            })
    }
}

/// Bind one value; NULLs are bound with the column's type so Postgres can infer it.
pub fn bind_value<'q>(
    query: Query<'q, Any, AnyArguments<'q>>,
    value: &SqlValue,
) -> Query<'q, Any, AnyArguments<'q>> {
    match value {
        SqlValue::Null(ColumnKind::BigInt) => query.bind(None::<i64>),
        SqlValue::Null(ColumnKind::Bool) => query.bind(None::<bool>),
        SqlValue::Null(ColumnKind::Float) => query.bind(None::<f64>),
        SqlValue::Null(ColumnKind::Text | ColumnKind::Timestamp) => query.bind(None::<String>),
        SqlValue::Bool(b) => query.bind(*b),
        SqlValue::Int(i) => query.bind(*i),
        SqlValue::Float(f) => query.bind(*f),
        SqlValue::Text(s) => query.bind(s.clone()),
    }
}

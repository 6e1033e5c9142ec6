//! # Audit Fields
//!
//! The fixed column set every persisted business row carries.
//!
//! ## Database Schema
//!
//! ```sql
//! -- postgres naming; the sqlite dialect uses "Id", "IsDeleted", ...
//! id          BIGSERIAL PRIMARY KEY,
//! is_deleted  BOOLEAN NOT NULL DEFAULT FALSE,
//! created_by  BIGINT,
//! created_at  TEXT,
//! modified_by BIGINT,
//! modified_at TEXT,
//! object_code TEXT,   -- unique (case-insensitive) among live rows
//! object_name TEXT
//! ```
//!
//! Timestamps are stored as `%Y-%m-%d %H:%M:%S%.6f` text on every backend.

use super::entity::ColumnDef;
use crate::error::{BizError, Result};
use crate::query_builder::{ColumnKind, SqlValue, TIMESTAMP_FORMAT};
use chrono::{NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

pub const AUDIT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::required("Id", ColumnKind::BigInt),
    ColumnDef::required("IsDeleted", ColumnKind::Bool),
    ColumnDef::optional("CreatedBy", ColumnKind::BigInt),
    ColumnDef::optional("CreatedAt", ColumnKind::Timestamp),
    ColumnDef::optional("ModifiedBy", ColumnKind::BigInt),
    ColumnDef::optional("ModifiedAt", ColumnKind::Timestamp),
    ColumnDef::optional("ObjectCode", ColumnKind::Text),
    ColumnDef::optional("ObjectName", ColumnKind::Text),
];

/// Audit columns written by INSERT (the id is generated)
pub const INSERT_COLUMNS: &[&str] = &[
    "IsDeleted",
    "CreatedBy",
    "CreatedAt",
    "ModifiedBy",
    "ModifiedAt",
    "ObjectCode",
    "ObjectName",
];

/// Audit columns written by UPDATE; creation stamps never change
pub const UPDATE_COLUMNS: &[&str] = &["ModifiedBy", "ModifiedAt", "ObjectCode", "ObjectName"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditFields {
    /// Surrogate id; `None` until inserted
    pub id: Option<i64>,
    pub is_deleted: bool,
    pub created_by: Option<i64>,
    pub created_at: Option<NaiveDateTime>,
    pub modified_by: Option<i64>,
    pub modified_at: Option<NaiveDateTime>,
    /// Business code, e.g. `INV2503000007`
    pub object_code: Option<String>,
    pub object_name: Option<String>,
}

impl AuditFields {
    pub fn named(name: &str) -> Self {
        Self {
            object_name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.object_code = Some(code.to_string());
        self
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    pub fn stamp_created(&mut self, user_id: i64, at: NaiveDateTime) {
        self.created_by = Some(user_id);
        self.created_at = Some(at);
        self.stamp_modified(user_id, at);
    }

    pub fn stamp_modified(&mut self, user_id: i64, at: NaiveDateTime) {
        self.modified_by = Some(user_id);
        self.modified_at = Some(at);
    }

    /// Values in [`INSERT_COLUMNS`] order
    pub fn insert_values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Bool(self.is_deleted),
            SqlValue::opt_int(self.created_by),
            SqlValue::opt_timestamp(self.created_at),
            SqlValue::opt_int(self.modified_by),
            SqlValue::opt_timestamp(self.modified_at),
            SqlValue::opt_text(self.object_code.as_deref()),
            SqlValue::opt_text(self.object_name.as_deref()),
        ]
    }

    /// Values in [`UPDATE_COLUMNS`] order
    pub fn update_values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::opt_int(self.modified_by),
            SqlValue::opt_timestamp(self.modified_at),
            SqlValue::opt_text(self.object_code.as_deref()),
            SqlValue::opt_text(self.object_name.as_deref()),
        ]
    }
}

/// Current UTC time at the precision the text format keeps.
pub fn now() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    let micros = now.nanosecond() / 1_000 * 1_000;
    now.with_nanosecond(micros).unwrap_or(now)
}

/// Parse a stored timestamp; also accepts ISO `T` separators and values without
/// fractional seconds written by other tools.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    const FALLBACK_FORMATS: &[&str] = &[
        TIMESTAMP_FORMAT,
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
    ];
    let trimmed = value.trim();
    FALLBACK_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| BizError::Mapping(format!("unparseable timestamp '{value}'")))
}

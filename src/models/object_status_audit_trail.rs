//! # Object Status Audit Trail
//!
//! Append-only record of status changes on entities that do not run a workflow:
//! registration, activation and termination.

use super::entity::{AppendOnlyRecord, ColumnDef};
use super::row::RowReader;
use super::workflow_history::required_timestamp;
use crate::error::{BizError, Result};
use crate::query_builder::{ColumnKind, SqlValue, TableDescriptor};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusAction {
    Register,
    Activate,
    /// Also soft-deletes the entity
    Terminate,
}

impl StatusAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusAction::Register => "REGISTER",
            StatusAction::Activate => "ACTIVATE",
            StatusAction::Terminate => "TERMINATE",
        }
    }
}

impl fmt::Display for StatusAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusAction {
    type Err = BizError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_uppercase().as_str() {
            "REGISTER" => Ok(StatusAction::Register),
            "ACTIVATE" => Ok(StatusAction::Activate),
            "TERMINATE" => Ok(StatusAction::Terminate),
            other => Err(BizError::Mapping(format!("unknown status action '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectStatusAuditTrail {
    pub id: Option<i64>,
    pub object_id: i64,
    pub object_type: String,
    pub user_id: i64,
    pub status_action: StatusAction,
    pub remark: Option<String>,
    pub created_at: NaiveDateTime,
    pub modified_at: NaiveDateTime,
}

const STATUS_TRAIL_COLUMNS: &[ColumnDef] = &[
    ColumnDef::required("ObjectId", ColumnKind::BigInt),
    ColumnDef::required("ObjectType", ColumnKind::Text),
    ColumnDef::required("UserId", ColumnKind::BigInt),
    ColumnDef::required("StatusAction", ColumnKind::Text),
    ColumnDef::optional("Remark", ColumnKind::Text),
    ColumnDef::required("CreatedAt", ColumnKind::Timestamp),
    ColumnDef::required("ModifiedAt", ColumnKind::Timestamp),
];

impl AppendOnlyRecord for ObjectStatusAuditTrail {
    const TABLE: TableDescriptor = TableDescriptor::new("ObjectStatusAuditTrail");

    fn columns() -> &'static [ColumnDef] {
        STATUS_TRAIL_COLUMNS
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Int(self.object_id),
            SqlValue::text(&self.object_type),
            SqlValue::Int(self.user_id),
            SqlValue::text(self.status_action.as_str()),
            SqlValue::opt_text(self.remark.as_deref()),
            SqlValue::timestamp(self.created_at),
            SqlValue::timestamp(self.modified_at),
        ]
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            id: row.opt_i64("Id")?,
            object_id: row.i64("ObjectId")?,
            object_type: row.string("ObjectType")?,
            user_id: row.i64("UserId")?,
            status_action: row.string("StatusAction")?.parse()?,
            remark: row.opt_string("Remark")?,
            created_at: required_timestamp(row, "CreatedAt")?,
            modified_at: required_timestamp(row, "ModifiedAt")?,
        })
    }
}

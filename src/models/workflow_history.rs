//! # Workflow History
//!
//! Append-only audit trail of workflow transitions. One row is written by the
//! transition engine in the same transaction as the entity change it describes; rows
//! are never updated or deleted.
//!
//! ## Database Schema
//!
//! ```sql
//! CREATE TABLE workflow_history (
//!   id BIGSERIAL PRIMARY KEY,
//!   object_id BIGINT NOT NULL,
//!   object_type TEXT NOT NULL,
//!   user_id BIGINT NOT NULL,
//!   org_unit_id BIGINT,
//!   target_user_id BIGINT,
//!   from_status TEXT NOT NULL,   -- '' for newly created entities
//!   to_status TEXT NOT NULL,
//!   action_code TEXT NOT NULL,
//!   remark TEXT,
//!   created_at TEXT NOT NULL,
//!   modified_at TEXT NOT NULL
//! );
//! ```

use super::entity::{AppendOnlyRecord, ColumnDef};
use super::row::RowReader;
use crate::error::Result;
use crate::query_builder::{ColumnKind, SqlValue, TableDescriptor};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowHistory {
    pub id: Option<i64>,
    pub object_id: i64,
    pub object_type: String,
    pub user_id: i64,
    pub org_unit_id: Option<i64>,
    pub target_user_id: Option<i64>,
    pub from_status: String,
    pub to_status: String,
    pub action_code: String,
    pub remark: Option<String>,
    pub created_at: NaiveDateTime,
    pub modified_at: NaiveDateTime,
}

const HISTORY_COLUMNS: &[ColumnDef] = &[
    ColumnDef::required("ObjectId", ColumnKind::BigInt),
    ColumnDef::required("ObjectType", ColumnKind::Text),
    ColumnDef::required("UserId", ColumnKind::BigInt),
    ColumnDef::optional("OrgUnitId", ColumnKind::BigInt),
    ColumnDef::optional("TargetUserId", ColumnKind::BigInt),
    ColumnDef::required("FromStatus", ColumnKind::Text),
    ColumnDef::required("ToStatus", ColumnKind::Text),
    ColumnDef::required("ActionCode", ColumnKind::Text),
    ColumnDef::optional("Remark", ColumnKind::Text),
    ColumnDef::required("CreatedAt", ColumnKind::Timestamp),
    ColumnDef::required("ModifiedAt", ColumnKind::Timestamp),
];

impl AppendOnlyRecord for WorkflowHistory {
    const TABLE: TableDescriptor = TableDescriptor::new("WorkflowHistory");

    fn columns() -> &'static [ColumnDef] {
        HISTORY_COLUMNS
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Int(self.object_id),
            SqlValue::text(&self.object_type),
            SqlValue::Int(self.user_id),
            SqlValue::opt_int(self.org_unit_id),
            SqlValue::opt_int(self.target_user_id),
            SqlValue::text(&self.from_status),
            SqlValue::text(&self.to_status),
            SqlValue::text(&self.action_code),
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
            org_unit_id: row.opt_i64("OrgUnitId")?,
            target_user_id: row.opt_i64("TargetUserId")?,
            from_status: row.opt_string("FromStatus")?.unwrap_or_default(),
            to_status: row.string("ToStatus")?,
            action_code: row.string("ActionCode")?,
            remark: row.opt_string("Remark")?,
            created_at: required_timestamp(row, "CreatedAt")?,
            modified_at: required_timestamp(row, "ModifiedAt")?,
        })
    }
}

pub(crate) fn required_timestamp(row: &RowReader<'_>, column: &str) -> Result<NaiveDateTime> {
    row.opt_timestamp(column)?.ok_or_else(|| {
        crate::error::BizError::Mapping(format!("column '{column}' is NULL"))
    })
}

use super::entity::{ColumnDef, Entity};
use crate::query_builder::{ColumnKind, SqlValue};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Logical name of the status column workflow entities declare
pub const WORKFLOW_STATUS_COLUMN: ColumnDef =
    ColumnDef::optional("WorkflowStatus", ColumnKind::Text);

/// Columns of [`AssignmentFields`], for entity types that support assignment actions
pub const ASSIGNMENT_COLUMNS: [ColumnDef; 2] = [
    ColumnDef::optional("AssignedUserId", ColumnKind::BigInt),
    ColumnDef::optional("AssignedAt", ColumnKind::Timestamp),
];

/// Who a workflow item is currently assigned to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentFields {
    pub assigned_user_id: Option<i64>,
    pub assigned_at: Option<NaiveDateTime>,
}

impl AssignmentFields {
    pub fn assign(&mut self, user_id: i64, at: NaiveDateTime) {
        self.assigned_user_id = Some(user_id);
        self.assigned_at = Some(at);
    }

    /// Values in [`ASSIGNMENT_COLUMNS`] order
    pub fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::opt_int(self.assigned_user_id),
            SqlValue::opt_timestamp(self.assigned_at),
        ]
    }
}

/// An entity with a free-form workflow status.
///
/// Types that support `ASSIGN`/`TRANSFER`/`SELF_PICKUP` return their
/// [`AssignmentFields`] from `assignment_mut`; everything else keeps the default.
pub trait WorkflowEntity: Entity {
    /// Current status; empty for entities that never transitioned
    fn workflow_status(&self) -> &str;

    fn set_workflow_status(&mut self, status: &str);

    fn assignment_mut(&mut self) -> Option<&mut AssignmentFields> {
        None
    }
}

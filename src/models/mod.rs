//! # Data Models
//!
//! Persisted types and the traits the generic layers are written against.
//!
//! - [`entity`] - [`Entity`] / [`AppendOnlyRecord`] descriptors, columns, associations
//! - [`audit`] - audit columns shared by every business row
//! - [`row`] - [`RowReader`], decoding by logical column name
//! - [`workflow`] - [`WorkflowEntity`] and the assignment capability
//! - [`running_number`] - generator and counter rows
//! - [`workflow_history`] / [`object_status_audit_trail`] - append-only trails

pub mod audit;
pub mod entity;
pub mod object_status_audit_trail;
pub mod row;
pub mod running_number;
pub mod workflow;
pub mod workflow_history;

pub use audit::AuditFields;
pub use entity::{AppendOnlyRecord, Association, ColumnDef, Entity};
pub use object_status_audit_trail::{ObjectStatusAuditTrail, StatusAction};
pub use row::RowReader;
pub use running_number::{IntervalGranularity, RunningNumberCounter, RunningNumberGenerator};
pub use workflow::{AssignmentFields, WorkflowEntity, ASSIGNMENT_COLUMNS, WORKFLOW_STATUS_COLUMN};
pub use workflow_history::WorkflowHistory;

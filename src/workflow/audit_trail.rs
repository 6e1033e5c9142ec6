use crate::error::Result;
use crate::models::{AppendOnlyRecord, ObjectStatusAuditTrail, RowReader, WorkflowHistory};
use crate::query_builder::{statements, Condition, Dialect, QueryBuilder};
use sqlx::AnyConnection;
use tracing::debug;

/// Writes and reads the append-only trails.
///
/// Writes always run on the caller's transaction; the trail row commits or rolls
/// back with the change it records.
#[derive(Debug, Clone, Copy)]
pub struct AuditTrailWriter {
    dialect: Dialect,
}

impl AuditTrailWriter {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub async fn insert_history(
        &self,
        conn: &mut AnyConnection,
        history: &mut WorkflowHistory,
    ) -> Result<i64> {
        let id = self.append(conn, &*history).await?;
        history.id = Some(id);
        Ok(id)
    }

    pub async fn insert_status_change(
        &self,
        conn: &mut AnyConnection,
        trail: &mut ObjectStatusAuditTrail,
    ) -> Result<i64> {
        let id = self.append(conn, &*trail).await?;
        trail.id = Some(id);
        Ok(id)
    }

    pub async fn history_for(
        &self,
        conn: &mut AnyConnection,
        object_type: &str,
        object_id: i64,
    ) -> Result<Vec<WorkflowHistory>> {
        self.records_for(conn, object_type, object_id).await
    }

    pub async fn status_trail_for(
        &self,
        conn: &mut AnyConnection,
        object_type: &str,
        object_id: i64,
    ) -> Result<Vec<ObjectStatusAuditTrail>> {
        self.records_for(conn, object_type, object_id).await
    }

    async fn append<R: AppendOnlyRecord>(&self, conn: &mut AnyConnection, record: &R) -> Result<i64> {
        let built = statements::insert(self.dialect, &R::TABLE, &R::column_names(), record.values())?;
        debug!(table = R::TABLE.logical, sql = %built.sql, "Append trail row");
        let row = built.query().fetch_one(&mut *conn).await?;
        RowReader::new(&row, self.dialect).i64("Id")
    }

    /// Rows for one object, oldest first.
    async fn records_for<R: AppendOnlyRecord>(
        &self,
        conn: &mut AnyConnection,
        object_type: &str,
        object_id: i64,
    ) -> Result<Vec<R>> {
        let mut columns = vec!["Id"];
        columns.extend(R::column_names());
        let built = QueryBuilder::new(self.dialect, R::TABLE)
            .without_soft_delete()
            .select(&columns)
            .filter(Condition::eq("ObjectType", object_type))
            .filter(Condition::eq("ObjectId", object_id))
            .order_asc("Id")
            .build_select()?;
        debug!(table = R::TABLE.logical, sql = %built.sql, "Select trail rows");

        let rows = built.query().fetch_all(&mut *conn).await?;
        rows.iter()
            .map(|row| R::from_row(&RowReader::new(row, self.dialect)))
            .collect()
    }
}

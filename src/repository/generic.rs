use super::search::{QuickSearchCommand, SearchCriteria};
use crate::database::migrations::code_index_name;
use crate::database::DatabaseConnection;
use crate::error::{BizError, Result};
use crate::logging::log_repository_operation;
use crate::models::audit::{now, INSERT_COLUMNS, UPDATE_COLUMNS};
use crate::models::{Entity, RowReader};
use crate::query_builder::{
    pagination, soft_delete, statements, BuiltQuery, ComparisonOperator, Condition, Dialect,
    Page, Pagination, QueryBuilder,
};
use crate::workflow::UserContext;
use sqlx::any::AnyRow;
use sqlx::{AnyConnection, Row};
use std::marker::PhantomData;
use tracing::debug;

/// Generic CRUD and search over one [`Entity`] type.
///
/// Every pool-based operation acquires one pooled connection for its duration; the
/// `*_in` variants run the same statements on a connection or transaction the caller
/// already holds. Soft-deleted rows are invisible to every read.
pub struct GenericRepository<E: Entity> {
    db: DatabaseConnection,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for GenericRepository<E> {
    fn clone(&self) -> Self {
        Self::new(self.db.clone())
    }
}

impl<E: Entity> std::fmt::Debug for GenericRepository<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericRepository")
            .field("entity", &E::OBJECT_TYPE)
            .field("dialect", &self.db.dialect())
            .finish()
    }
}

impl<E: Entity> GenericRepository<E> {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.db.dialect()
    }

    pub fn database(&self) -> &DatabaseConnection {
        &self.db
    }

    /// `ceil(total / page_size)`, page size 0 treated as 1
    pub fn get_page_count(total: i64, page_size: i64) -> i64 {
        pagination::get_page_count(total, page_size)
    }

    /// Base SELECT: audit + entity columns, associations joined
    pub fn query(&self) -> QueryBuilder {
        E::associations().iter().fold(
            QueryBuilder::new(self.dialect(), E::TABLE).select(&E::select_columns()),
            |query, association| query.join(association.to_join()),
        )
    }

    fn criteria_query(&self, criteria: &SearchCriteria) -> QueryBuilder {
        let query = self
            .query()
            .filters(criteria.conditions.iter().cloned())
            .paginate(criteria.pagination);
        criteria
            .order_by
            .iter()
            .fold(query, |query, order| query.order_by(order.clone()))
    }

    // ----- reads ---------------------------------------------------------------

    pub async fn get_by_id(&self, id: i64) -> Result<Option<E>> {
        let mut conn = self.db.acquire().await?;
        self.get_by_id_in(&mut conn, id).await
    }

    pub async fn get_by_id_in(&self, conn: &mut AnyConnection, id: i64) -> Result<Option<E>> {
        let built = self.query().filter(Condition::eq("Id", id)).build_select()?;
        Ok(self.fetch_entities(conn, &built).await?.into_iter().next())
    }

    /// Case-insensitive exact match on `ObjectCode`
    pub async fn get_by_business_code(&self, code: &str) -> Result<Option<E>> {
        let mut conn = self.db.acquire().await?;
        self.get_by_business_code_in(&mut conn, code).await
    }

    pub async fn get_by_business_code_in(
        &self,
        conn: &mut AnyConnection,
        code: &str,
    ) -> Result<Option<E>> {
        let built = self
            .query()
            .filter(Condition::eq_ignore_case("ObjectCode", code))
            .build_select()?;
        Ok(self.fetch_entities(conn, &built).await?.into_iter().next())
    }

    pub async fn get_all(&self) -> Result<Vec<E>> {
        self.search(&SearchCriteria::new()).await
    }

    pub async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<E>> {
        let mut conn = self.db.acquire().await?;
        self.search_in(&mut conn, criteria).await
    }

    pub async fn search_in(
        &self,
        conn: &mut AnyConnection,
        criteria: &SearchCriteria,
    ) -> Result<Vec<E>> {
        let built = self.criteria_query(criteria).build_select()?;
        self.fetch_entities(conn, &built).await
    }

    /// Row count for `criteria`, ignoring its page window
    pub async fn count(&self, criteria: &SearchCriteria) -> Result<i64> {
        let mut conn = self.db.acquire().await?;
        self.count_in(&mut conn, criteria).await
    }

    pub async fn count_in(&self, conn: &mut AnyConnection, criteria: &SearchCriteria) -> Result<i64> {
        let built = self.criteria_query(criteria).build_count()?;
        fetch_count(conn, &built).await
    }

    /// One page of items plus total and page count, on one connection.
    pub async fn search_page(&self, criteria: &SearchCriteria) -> Result<Page<E>> {
        let mut conn = self.db.acquire().await?;
        self.search_page_in(&mut conn, criteria).await
    }

    pub async fn search_page_in(
        &self,
        conn: &mut AnyConnection,
        criteria: &SearchCriteria,
    ) -> Result<Page<E>> {
        let query = self.criteria_query(criteria);
        let total = fetch_count(conn, &query.build_count()?).await?;
        let items = self.fetch_entities(conn, &query.build_select()?).await?;
        Ok(Page::new(items, total, criteria.pagination))
    }

    pub async fn quick_search(&self, text: &str, pagination: Pagination) -> Result<Vec<E>> {
        let criteria = QuickSearchCommand::parse(text)?.to_criteria(pagination);
        self.search(&criteria).await
    }

    pub async fn quick_search_count(&self, text: &str) -> Result<i64> {
        let criteria = QuickSearchCommand::parse(text)?.to_criteria(Pagination::unpaged());
        self.count(&criteria).await
    }

    /// Whether another live row already uses `code` (case-insensitive).
    /// `id` excludes the row being edited.
    pub async fn duplicate_code_check(&self, id: Option<i64>, code: &str) -> Result<bool> {
        let mut conn = self.db.acquire().await?;
        self.duplicate_code_check_in(&mut conn, id, code).await
    }

    pub async fn duplicate_code_check_in(
        &self,
        conn: &mut AnyConnection,
        id: Option<i64>,
        code: &str,
    ) -> Result<bool> {
        if code.trim().is_empty() {
            return Ok(false);
        }
        let mut criteria = SearchCriteria::new().where_eq_ignore_case("ObjectCode", code);
        if let Some(id) = id {
            criteria = criteria.where_compare("Id", ComparisonOperator::NotEq, id);
        }
        Ok(self.count_in(conn, &criteria).await? > 0)
    }

    // ----- writes --------------------------------------------------------------

    /// Insert a new row and return its id. Creation and modification stamps are set
    /// on `entity` only once the row exists.
    pub async fn insert(&self, entity: &mut E, acting_user: &dyn UserContext) -> Result<i64> {
        let mut conn = self.db.acquire().await?;
        self.insert_in(&mut conn, entity, acting_user).await
    }

    pub async fn insert_in(
        &self,
        conn: &mut AnyConnection,
        entity: &mut E,
        acting_user: &dyn UserContext,
    ) -> Result<i64> {
        let user_id = acting_user.resolved_user_id()?;
        if let Some(id) = entity.id() {
            return Err(BizError::Validation(format!(
                "{} {id} is already persisted",
                E::OBJECT_TYPE
            )));
        }

        let mut audit = entity.audit().clone();
        audit.is_deleted = false;
        audit.stamp_created(user_id, now());

        let columns = with_entity_columns::<E>(INSERT_COLUMNS);
        let mut values = audit.insert_values();
        values.extend(entity.values());
        let built = statements::insert(self.dialect(), &E::TABLE, &columns, values)?;
        debug!(entity = E::OBJECT_TYPE, sql = %built.sql, "Insert");

        let row = built
            .query()
            .fetch_one(&mut *conn)
            .await
            .map_err(|err| self.classify(err, audit.object_code.as_deref()))?;
        let id = RowReader::new(&row, self.dialect()).i64("Id")?;

        audit.id = Some(id);
        *entity.audit_mut() = audit;
        log_repository_operation("insert", E::OBJECT_TYPE, Some(id), "created");
        Ok(id)
    }

    /// Update a live row; `false` when no live row has the entity's id.
    pub async fn update(&self, entity: &mut E, acting_user: &dyn UserContext) -> Result<bool> {
        let mut conn = self.db.acquire().await?;
        self.update_in(&mut conn, entity, acting_user).await
    }

    pub async fn update_in(
        &self,
        conn: &mut AnyConnection,
        entity: &mut E,
        acting_user: &dyn UserContext,
    ) -> Result<bool> {
        let user_id = acting_user.resolved_user_id()?;
        let id = entity.id().ok_or_else(|| {
            BizError::Validation(format!("{} has not been persisted", E::OBJECT_TYPE))
        })?;

        let mut audit = entity.audit().clone();
        audit.stamp_modified(user_id, now());

        let columns = with_entity_columns::<E>(UPDATE_COLUMNS);
        let mut values = audit.update_values();
        values.extend(entity.values());
        let built = statements::update_by_id(self.dialect(), &E::TABLE, &columns, values, id)?;
        debug!(entity = E::OBJECT_TYPE, sql = %built.sql, "Update");

        let result = built
            .query()
            .execute(&mut *conn)
            .await
            .map_err(|err| self.classify(err, audit.object_code.as_deref()))?;
        let affected = result.rows_affected() > 0;
        if affected {
            *entity.audit_mut() = audit;
        }
        log_repository_operation(
            "update",
            E::OBJECT_TYPE,
            Some(id),
            if affected { "updated" } else { "no_rows" },
        );
        Ok(affected)
    }

    /// Mark a live row deleted and stamp the modifier; the row stays in the table.
    pub async fn soft_delete(&self, id: i64, acting_user: &dyn UserContext) -> Result<bool> {
        let mut conn = self.db.acquire().await?;
        self.soft_delete_in(&mut conn, id, acting_user).await
    }

    pub async fn soft_delete_in(
        &self,
        conn: &mut AnyConnection,
        id: i64,
        acting_user: &dyn UserContext,
    ) -> Result<bool> {
        let user_id = acting_user.resolved_user_id()?;
        let built = soft_delete::mark_deleted(self.dialect(), &E::TABLE, id, user_id, now());
        let affected = execute(conn, &built).await? > 0;
        log_repository_operation(
            "soft_delete",
            E::OBJECT_TYPE,
            Some(id),
            if affected { "deleted" } else { "no_rows" },
        );
        Ok(affected)
    }

    /// Stamp the modifier of a live row without changing anything else.
    pub async fn touch_in(
        &self,
        conn: &mut AnyConnection,
        id: i64,
        acting_user: &dyn UserContext,
    ) -> Result<bool> {
        let user_id = acting_user.resolved_user_id()?;
        let built = statements::update_by_id(
            self.dialect(),
            &E::TABLE,
            &["ModifiedBy", "ModifiedAt"],
            vec![user_id.into(), now().into()],
            id,
        )?;
        Ok(execute(conn, &built).await? > 0)
    }

    /// Physically remove a row, deleted or not. Administrative use only.
    pub async fn hard_delete(&self, id: i64) -> Result<bool> {
        let mut conn = self.db.acquire().await?;
        self.hard_delete_in(&mut conn, id).await
    }

    pub async fn hard_delete_in(&self, conn: &mut AnyConnection, id: i64) -> Result<bool> {
        let built = statements::delete_by_id(self.dialect(), &E::TABLE, id);
        let affected = execute(conn, &built).await? > 0;
        log_repository_operation(
            "hard_delete",
            E::OBJECT_TYPE,
            Some(id),
            if affected { "removed" } else { "no_rows" },
        );
        Ok(affected)
    }

    // ----- helpers -------------------------------------------------------------

    async fn fetch_entities(&self, conn: &mut AnyConnection, built: &BuiltQuery) -> Result<Vec<E>> {
        debug!(entity = E::OBJECT_TYPE, sql = %built.sql, params = built.params.len(), "Select");
        let rows: Vec<AnyRow> = built.query().fetch_all(&mut *conn).await?;
        rows.iter()
            .map(|row| E::from_row(&RowReader::new(row, self.dialect())))
            .collect()
    }

    /// Business-code index violations become `DuplicateCode`.
    fn classify(&self, err: sqlx::Error, code: Option<&str>) -> BizError {
        let err = BizError::from(err);
        let index = code_index_name(self.dialect(), &E::TABLE);
        match (&err, code) {
            (BizError::ConstraintViolation(message) | BizError::Database(message), Some(code))
                if message.contains(&index) =>
            {
                BizError::DuplicateCode {
                    entity_type: E::OBJECT_TYPE.to_string(),
                    code: code.to_string(),
                }
            }
            _ => err,
        }
    }
}

fn with_entity_columns<E: Entity>(audit_columns: &[&'static str]) -> Vec<&'static str> {
    audit_columns
        .iter()
        .copied()
        .chain(E::columns().iter().map(|column| column.name))
        .collect()
}

async fn fetch_count(conn: &mut AnyConnection, built: &BuiltQuery) -> Result<i64> {
    debug!(sql = %built.sql, "Count");
    let row: AnyRow = built.query().fetch_one(&mut *conn).await?;
    row.try_get::<i64, _>(0)
        .or_else(|_| row.try_get::<i32, _>(0).map(i64::from))
        .map_err(|err| BizError::Mapping(format!("count: {err}")))
}

async fn execute(conn: &mut AnyConnection, built: &BuiltQuery) -> Result<u64> {
    debug!(sql = %built.sql, "Execute");
    Ok(built.query().execute(&mut *conn).await?.rows_affected())
}

use super::params::{BuiltQuery, ParamBag};
use super::soft_delete::not_deleted;
use super::{Condition, Dialect, Join, Pagination, TableDescriptor, WhereClause};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Alias of the queried table in every rendered statement
pub const BASE_ALIAS: &str = "t";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Desc,
        }
    }
}

/// Dialect-aware SELECT/COUNT builder over one base table.
///
/// The soft-delete predicate is always the first WHERE term unless the table has no
/// delete flag (append-only history tables). Ordering always ends with `Id ASC` so
/// paging is stable.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    dialect: Dialect,
    table: TableDescriptor,
    select_fields: Vec<String>,
    joins: Vec<Join>,
    where_clauses: Vec<WhereClause>,
    order_by: Vec<OrderBy>,
    pagination: Pagination,
    soft_delete: bool,
}

impl QueryBuilder {
    /// Create a new query builder for the given table
    pub fn new(dialect: Dialect, table: TableDescriptor) -> Self {
        Self {
            dialect,
            table,
            select_fields: Vec::new(),
            joins: Vec::new(),
            where_clauses: Vec::new(),
            order_by: Vec::new(),
            pagination: Pagination::unpaged(),
            soft_delete: true,
        }
    }

    /// Set the base-table columns to select (logical names); empty selects `t.*`
    pub fn select(mut self, fields: &[&str]) -> Self {
        self.select_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Add an eager-loaded association
    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// Add a WHERE clause; clauses are AND-ed together
    pub fn where_clause(mut self, clause: WhereClause) -> Self {
        self.where_clauses.push(clause);
        self
    }

    pub fn filter(self, condition: Condition) -> Self {
        self.where_clause(WhereClause::and(vec![condition]))
    }

    pub fn filters(mut self, conditions: impl IntoIterator<Item = Condition>) -> Self {
        for condition in conditions {
            self = self.filter(condition);
        }
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn order_asc(self, field: &str) -> Self {
        self.order_by(OrderBy::asc(field))
    }

    pub fn order_desc(self, field: &str) -> Self {
        self.order_by(OrderBy::desc(field))
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    /// For tables without an `IsDeleted` column
    pub fn without_soft_delete(mut self) -> Self {
        self.soft_delete = false;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Build the list query, windowed when pagination is set.
    pub fn build_select(&self) -> Result<BuiltQuery> {
        let mut params = ParamBag::new(self.dialect);
        let select_list = self.render_select_list();
        let from_where = self.render_from_where(&mut params)?;
        let order_by = self.render_order_by()?;
        let sql = self.dialect.paginate(
            &select_list,
            &from_where,
            &order_by,
            self.pagination.window(),
        );
        Ok(BuiltQuery::new(sql, params))
    }

    /// Build the matching COUNT query from the same FROM/JOIN/WHERE rendering.
    pub fn build_count(&self) -> Result<BuiltQuery> {
        let mut params = ParamBag::new(self.dialect);
        let from_where = self.render_from_where(&mut params)?;
        Ok(BuiltQuery::new(format!("SELECT COUNT(*) {from_where}"), params))
    }

    fn render_select_list(&self) -> String {
        let mut columns: Vec<String> = if self.select_fields.is_empty() {
            vec![format!("{}.*", self.dialect.alias(BASE_ALIAS))]
        } else {
            self.select_fields
                .iter()
                .map(|field| self.dialect.qualified(BASE_ALIAS, field))
                .collect()
        };
        for join in &self.joins {
            columns.extend(join.select_columns(self.dialect));
        }
        columns.join(", ")
    }

    fn render_from_where(&self, params: &mut ParamBag) -> Result<String> {
        let mut sql = format!(
            "FROM {} {}",
            self.dialect.table_name(&self.table),
            self.dialect.alias(BASE_ALIAS)
        );

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.to_sql(self.dialect, BASE_ALIAS));
        }

        let mut where_parts = Vec::with_capacity(self.where_clauses.len() + 1);
        if self.soft_delete {
            where_parts.push(not_deleted(self.dialect, BASE_ALIAS));
        }
        for clause in &self.where_clauses {
            let rendered = clause.to_sql(self.dialect, BASE_ALIAS, params)?;
            if clause.conditions.len() > 1 {
                where_parts.push(format!("({rendered})"));
            } else {
                where_parts.push(rendered);
            }
        }

        if !where_parts.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_parts.join(" AND "));
        }
        Ok(sql)
    }

    fn render_order_by(&self) -> Result<String> {
        let mut parts = Vec::with_capacity(self.order_by.len() + 1);
        let mut has_id = false;
        for order in &self.order_by {
            let column = self.dialect.column_ref(&order.field, BASE_ALIAS)?;
            has_id |= order.field == "Id" || order.field == format!("{BASE_ALIAS}.Id");
            parts.push(format!("{} {}", column, order.direction.to_sql()));
        }
        if !has_id {
            parts.push(format!("{} ASC", self.dialect.qualified(BASE_ALIAS, "Id")));
        }
        Ok(parts.join(", "))
    }
}

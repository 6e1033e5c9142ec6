use super::params::{ParamBag, SqlValue};
use super::Dialect;
use crate::error::{BizError, Result};

/// Comparison operators accepted by [`Condition::Compare`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl ComparisonOperator {
    pub fn to_sql(&self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "=",
            ComparisonOperator::NotEq => "<>",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::LtEq => "<=",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::GtEq => ">=",
        }
    }
}

/// Represents the fixed predicate vocabulary. Fields are logical column references
/// (`ObjectName` or `Alias.ObjectName`).
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        field: String,
        operator: ComparisonOperator,
        value: SqlValue,
    },
    /// Case-insensitive exact match
    EqualsIgnoreCase { field: String, value: String },
    /// Case-insensitive substring match
    Contains { field: String, value: String },
    In {
        field: String,
        values: Vec<SqlValue>,
    },
    NotIn {
        field: String,
        values: Vec<SqlValue>,
    },
    /// Inclusive range
    Between {
        field: String,
        start: SqlValue,
        end: SqlValue,
    },
    IsNull { field: String },
    IsNotNull { field: String },
    /// `<alias>.IsDeleted = FALSE`
    NotDeleted { alias: String },
    Group(WhereClause),
}

impl Condition {
    pub fn eq(field: &str, value: impl Into<SqlValue>) -> Self {
        Self::compare(field, ComparisonOperator::Eq, value)
    }

    pub fn compare(field: &str, operator: ComparisonOperator, value: impl Into<SqlValue>) -> Self {
        Condition::Compare {
            field: field.to_string(),
            operator,
            value: value.into(),
        }
    }

    pub fn eq_ignore_case(field: &str, value: &str) -> Self {
        Condition::EqualsIgnoreCase {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn contains(field: &str, value: &str) -> Self {
        Condition::Contains {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// Convert condition to SQL, pushing every value into `params`.
    pub fn to_sql(&self, dialect: Dialect, base_alias: &str, params: &mut ParamBag) -> Result<String> {
        let column = |field: &str| dialect.column_ref(field, base_alias);
        Ok(match self {
            Condition::Compare {
                field,
                operator,
                value,
            } => {
                if value.is_null() {
                    return Err(BizError::Validation(format!(
                        "comparison on '{field}' with NULL; use IsNull/IsNotNull"
                    )));
                }
                format!("{} {} {}", column(field)?, operator.to_sql(), params.push(value.clone()))
            }
            // Both sides go through the same SQL function, so a value always
            // matches itself whatever the backend's folding rules are.
            Condition::EqualsIgnoreCase { field, value } => format!(
                "{} = {}",
                dialect.fold(&column(field)?),
                dialect.fold(&params.push(SqlValue::text(value.as_str())))
            ),
            Condition::Contains { field, value } => {
                let pattern = format!("%{}%", escape_like(value));
                format!(
                    "{} LIKE {} ESCAPE '\\'",
                    dialect.fold(&column(field)?),
                    dialect.fold(&params.push(SqlValue::Text(pattern)))
                )
            }
            Condition::In { field, values } => {
                if values.is_empty() {
                    "1=0".to_string()
                } else {
                    format!("{} IN ({})", column(field)?, push_list(values, params))
                }
            }
            Condition::NotIn { field, values } => {
                if values.is_empty() {
                    "1=1".to_string()
                } else {
                    format!("{} NOT IN ({})", column(field)?, push_list(values, params))
                }
            }
            Condition::Between { field, start, end } => format!(
                "{} BETWEEN {} AND {}",
                column(field)?,
                params.push(start.clone()),
                params.push(end.clone())
            ),
            Condition::IsNull { field } => format!("{} IS NULL", column(field)?),
            Condition::IsNotNull { field } => format!("{} IS NOT NULL", column(field)?),
            Condition::NotDeleted { alias } => super::soft_delete::not_deleted(dialect, alias),
            Condition::Group(clause) => format!("({})", clause.to_sql(dialect, base_alias, params)?),
        })
    }
}

fn push_list(values: &[SqlValue], params: &mut ParamBag) -> String {
    values
        .iter()
        .map(|v| params.push(v.clone()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Escape LIKE wildcards so user text matches literally under `ESCAPE '\'`.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Represents a WHERE clause that can contain multiple conditions
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub conditions: Vec<Condition>,
    pub operator: LogicalOperator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

impl WhereClause {
    pub fn and(conditions: Vec<Condition>) -> Self {
        Self {
            conditions,
            operator: LogicalOperator::And,
        }
    }

    pub fn or(conditions: Vec<Condition>) -> Self {
        Self {
            conditions,
            operator: LogicalOperator::Or,
        }
    }

    /// Empty AND renders as true, empty OR as false.
    pub fn to_sql(&self, dialect: Dialect, base_alias: &str, params: &mut ParamBag) -> Result<String> {
        if self.conditions.is_empty() {
            return Ok(match self.operator {
                LogicalOperator::And => "1=1".to_string(),
                LogicalOperator::Or => "1=0".to_string(),
            });
        }

        let separator = match self.operator {
            LogicalOperator::And => " AND ",
            LogicalOperator::Or => " OR ",
        };
        let parts = self
            .conditions
            .iter()
            .map(|condition| condition.to_sql(dialect, base_alias, params))
            .collect::<Result<Vec<_>>>()?;
        Ok(parts.join(separator))
    }
}

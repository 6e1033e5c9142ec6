//! Search criteria and the quick-search command grammar.

use crate::error::{BizError, Result};
use crate::query_builder::{
    ComparisonOperator, Condition, OrderBy, Pagination, SqlValue, WhereClause,
};
use std::str::FromStr;

/// Filters, sort keys and an optional page window. List and count queries are both
/// built from the same criteria.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCriteria {
    pub conditions: Vec<Condition>,
    pub order_by: Vec<OrderBy>,
    pub pagination: Pagination,
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn where_eq(self, field: &str, value: impl Into<SqlValue>) -> Self {
        self.filter(Condition::eq(field, value))
    }

    pub fn where_compare(
        self,
        field: &str,
        operator: ComparisonOperator,
        value: impl Into<SqlValue>,
    ) -> Self {
        self.filter(Condition::compare(field, operator, value))
    }

    pub fn where_eq_ignore_case(self, field: &str, value: &str) -> Self {
        self.filter(Condition::eq_ignore_case(field, value))
    }

    pub fn where_contains(self, field: &str, value: &str) -> Self {
        self.filter(Condition::contains(field, value))
    }

    pub fn where_in(self, field: &str, values: Vec<SqlValue>) -> Self {
        self.filter(Condition::In {
            field: field.to_string(),
            values,
        })
    }

    pub fn where_not_in(self, field: &str, values: Vec<SqlValue>) -> Self {
        self.filter(Condition::NotIn {
            field: field.to_string(),
            values,
        })
    }

    pub fn where_between(
        self,
        field: &str,
        start: impl Into<SqlValue>,
        end: impl Into<SqlValue>,
    ) -> Self {
        self.filter(Condition::Between {
            field: field.to_string(),
            start: start.into(),
            end: end.into(),
        })
    }

    pub fn where_null(self, field: &str) -> Self {
        self.filter(Condition::IsNull {
            field: field.to_string(),
        })
    }

    pub fn where_not_null(self, field: &str) -> Self {
        self.filter(Condition::IsNotNull {
            field: field.to_string(),
        })
    }

    /// Any of `conditions`
    pub fn where_any(self, conditions: Vec<Condition>) -> Self {
        self.filter(Condition::Group(WhereClause::or(conditions)))
    }

    pub fn order_asc(mut self, field: &str) -> Self {
        self.order_by.push(OrderBy::asc(field));
        self
    }

    pub fn order_desc(mut self, field: &str) -> Self {
        self.order_by.push(OrderBy::desc(field));
        self
    }

    pub fn paginate(mut self, page_number: u32, page_size: u32) -> Self {
        self.pagination = Pagination::new(page_number, page_size);
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }
}

/// Parsed quick-search text.
///
/// - `id:<n>` matches the id
/// - `code:<x>` matches the business code, case-insensitively
/// - blank text matches everything
/// - anything else is a case-insensitive substring match on `ObjectName`
///
/// Prefixes are case-insensitive and surrounding whitespace is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuickSearchCommand {
    All,
    ById(i64),
    ByCode(String),
    ByName(String),
}

impl QuickSearchCommand {
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(QuickSearchCommand::All);
        }

        if let Some(rest) = strip_prefix_ignore_case(trimmed, "id:") {
            let rest = rest.trim();
            return rest
                .parse::<i64>()
                .map(QuickSearchCommand::ById)
                .map_err(|_| BizError::Validation(format!("'{rest}' is not a valid id")));
        }

        if let Some(rest) = strip_prefix_ignore_case(trimmed, "code:") {
            let rest = rest.trim();
            if rest.is_empty() {
                return Err(BizError::Validation("code search needs a value".to_string()));
            }
            return Ok(QuickSearchCommand::ByCode(rest.to_string()));
        }

        Ok(QuickSearchCommand::ByName(trimmed.to_string()))
    }

    /// Predicate for this command; `None` for `All`.
    pub fn condition(&self) -> Option<Condition> {
        match self {
            QuickSearchCommand::All => None,
            QuickSearchCommand::ById(id) => Some(Condition::eq("Id", *id)),
            QuickSearchCommand::ByCode(code) => Some(Condition::eq_ignore_case("ObjectCode", code)),
            QuickSearchCommand::ByName(name) => Some(Condition::contains("ObjectName", name)),
        }
    }

    /// Criteria for this command with the given page window.
    pub fn to_criteria(&self, pagination: Pagination) -> SearchCriteria {
        let criteria = SearchCriteria::new().with_pagination(pagination);
        match self.condition() {
            Some(condition) => criteria.filter(condition),
            None => criteria,
        }
    }
}

impl FromStr for QuickSearchCommand {
    type Err = BizError;

    fn from_str(text: &str) -> Result<Self> {
        Self::parse(text)
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

//! # Query Builder System
//!
//! Dialect-aware SQL rendering from neutral directives.
//!
//! ## Overview
//!
//! Entity and repository code never writes SQL by hand and never branches on the
//! dialect. It describes *what* to read or write with logical PascalCase names, and
//! this module renders parameterized SQL for the configured [`Dialect`]:
//!
//! - [`dialect`] - identifier conventions, placeholders, case folding, paging syntax
//! - [`conditions`] - the fixed predicate vocabulary and AND/OR grouping
//! - [`joins`] - eager-loaded associations with their own soft-delete filter
//! - [`pagination`] - 1-based page windows, page counts and [`Page`]
//! - [`builder`] - SELECT and COUNT assembly from one shared predicate rendering
//! - [`statements`] - INSERT/UPDATE/DELETE by id
//! - [`soft_delete`] - the `IsDeleted` convention
//! - [`params`] - parameter bag and typed binding
//!
//! ## Example Usage
//!
//! ```rust
//! use bizcore::query_builder::{Condition, Dialect, Pagination, QueryBuilder, TableDescriptor};
//!
//! const VENUE: TableDescriptor = TableDescriptor::new("Venue");
//!
//! let query = QueryBuilder::new(Dialect::Postgres, VENUE)
//!     .select(&["Id", "ObjectName"])
//!     .filter(Condition::contains("ObjectName", "hall"))
//!     .paginate(Pagination::new(2, 25));
//!
//! let list = query.build_select().unwrap();
//! let count = query.build_count().unwrap();
//! assert!(list.sql.ends_with("LIMIT 25 OFFSET 25"));
//! assert_eq!(list.params, count.params);
//! ```

pub mod builder;
pub mod conditions;
pub mod dialect;
pub mod joins;
pub mod pagination;
pub mod params;
pub mod soft_delete;
pub mod statements;

pub use builder::{OrderBy, QueryBuilder, SortDirection, BASE_ALIAS};
pub use conditions::{ComparisonOperator, Condition, LogicalOperator, WhereClause};
pub use dialect::{Dialect, TableDescriptor};
pub use joins::{Join, JoinType};
pub use pagination::{get_page_count, Page, Pagination};
pub use params::{BuiltQuery, ColumnKind, ParamBag, SqlValue, TIMESTAMP_FORMAT};

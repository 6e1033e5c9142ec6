//! # Generic Repository
//!
//! Dialect-portable CRUD, search and paging over any [`Entity`](crate::models::Entity).
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use bizcore::repository::{GenericRepository, SearchCriteria};
//!
//! let venues = GenericRepository::<Venue>::new(db.clone());
//! let criteria = SearchCriteria::new()
//!     .where_contains("ObjectName", "hall")
//!     .order_asc("ObjectName")
//!     .paginate(1, 20);
//! let page = venues.search_page(&criteria).await?;
//! println!("{} of {} venues, {} pages", page.items.len(), page.total, page.page_count);
//! ```

pub mod generic;
pub mod search;

pub use generic::GenericRepository;
pub use search::{QuickSearchCommand, SearchCriteria};

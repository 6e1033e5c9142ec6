//! # Workflow
//!
//! Transactional save-and-transition for workflow entities, the append-only trails it
//! writes, and the acting-user contract.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use bizcore::workflow::{SessionUser, StaticTransitionTable, WorkflowTransitionEngine};
//! use std::sync::Arc;
//!
//! let table = StaticTransitionTable::new()
//!     .transition_from("REGISTER", &[""], "PENDING")
//!     .transition("ASSIGN", "ASSIGNED");
//! let engine = WorkflowTransitionEngine::<Event>::new(db.clone(), Arc::new(table));
//!
//! let mut event = Event::named("Launch");
//! let outcome = engine
//!     .save_and_transit(&mut event, &SessionUser::new(7, "Ana"), None, "REGISTER", None)
//!     .await?;
//! assert_eq!(outcome.to_status(), "PENDING");
//! ```

pub mod audit_trail;
pub mod engine;
pub mod transition_table;
pub mod user;

pub use audit_trail::AuditTrailWriter;
pub use engine::{TransitionOutcome, WorkflowTransitionEngine};
pub use transition_table::{StaticTransitionTable, TransitionTable};
pub use user::{SessionUser, UserContext};

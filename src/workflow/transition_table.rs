//! Per-entity-type mapping of workflow actions to resulting statuses.

use crate::error::{BizError, Result};
use std::collections::{HashMap, HashSet};

/// Action → status mapping for one workflow entity type.
///
/// Actions and statuses are compared exactly as configured after trimming; the
/// constants in [`crate::constants::actions`] are upper case.
pub trait TransitionTable: Send + Sync {
    /// Status an action leads to, or `None` when the action is not configured.
    fn resulting_status(&self, action: &str) -> Option<&str>;

    /// Whether `action` may be taken from `current_status` (empty for new entities).
    fn is_allowed_from(&self, action: &str, current_status: &str) -> bool;

    /// Resolve the resulting status or explain why the action is not possible.
    fn resolve(&self, entity_type: &str, current_status: &str, action: &str) -> Result<String> {
        let action = action.trim();
        let status = self
            .resulting_status(action)
            .ok_or_else(|| BizError::MissingTransition {
                entity_type: entity_type.to_string(),
                action: action.to_string(),
            })?;
        if !self.is_allowed_from(action, current_status) {
            return Err(BizError::InvalidTransition {
                entity_type: entity_type.to_string(),
                status: current_status.to_string(),
                action: action.to_string(),
            });
        }
        Ok(status.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TransitionRule {
    to_status: String,
    /// `None` allows the action from any status
    from_statuses: Option<HashSet<String>>,
}

/// Transition table built in code.
///
/// ```rust
/// use bizcore::workflow::{StaticTransitionTable, TransitionTable};
///
/// let table = StaticTransitionTable::new()
///     .transition_from("REGISTER", &[""], "PENDING")
///     .transition_from("APPROVE", &["PENDING"], "APPROVED")
///     .transition("ASSIGN", "ASSIGNED");
///
/// assert_eq!(table.resulting_status("REGISTER"), Some("PENDING"));
/// assert!(!table.is_allowed_from("APPROVE", "APPROVED"));
/// assert!(table.is_allowed_from("ASSIGN", "APPROVED"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticTransitionTable {
    rules: HashMap<String, TransitionRule>,
}

impl StaticTransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// `action` leads to `to_status` from any status.
    pub fn transition(mut self, action: &str, to_status: &str) -> Self {
        self.rules.insert(
            action.trim().to_string(),
            TransitionRule {
                to_status: to_status.to_string(),
                from_statuses: None,
            },
        );
        self
    }

    /// `action` leads to `to_status`, only from the listed statuses. `""` stands for a
    /// new entity.
    pub fn transition_from(mut self, action: &str, from_statuses: &[&str], to_status: &str) -> Self {
        self.rules.insert(
            action.trim().to_string(),
            TransitionRule {
                to_status: to_status.to_string(),
                from_statuses: Some(from_statuses.iter().map(|s| s.trim().to_string()).collect()),
            },
        );
        self
    }

    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl TransitionTable for StaticTransitionTable {
    fn resulting_status(&self, action: &str) -> Option<&str> {
        self.rules
            .get(action.trim())
            .map(|rule| rule.to_status.as_str())
    }

    fn is_allowed_from(&self, action: &str, current_status: &str) -> bool {
        match self.rules.get(action.trim()) {
            Some(TransitionRule {
                from_statuses: Some(from),
                ..
            }) => from.contains(current_status.trim()),
            Some(_) => true,
            None => false,
        }
    }
}

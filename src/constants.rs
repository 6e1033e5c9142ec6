//! # Constants
//!
//! Action codes with engine-level meaning and environment defaults.

/// Workflow action codes the transition engine treats specially.
///
/// Any other action is only looked up in the entity type's transition table.
pub mod actions {
    pub const REGISTER: &str = "REGISTER";
    /// Assign to the target user
    pub const ASSIGN: &str = "ASSIGN";
    /// Re-assign to the target user
    pub const TRANSFER: &str = "TRANSFER";
    /// Assign to the acting user
    pub const SELF_PICKUP: &str = "SELF_PICKUP";

    /// Actions that write the assignment fields
    pub const ASSIGNMENT_ACTIONS: &[&str] = &[ASSIGN, TRANSFER, SELF_PICKUP];

    pub fn is_assignment(action: &str) -> bool {
        ASSIGNMENT_ACTIONS.contains(&action.trim())
    }
}

/// Environment variables read at startup
pub mod env {
    pub const BIZCORE_ENV: &str = "BIZCORE_ENV";
    pub const APP_ENV: &str = "APP_ENV";
    pub const DATABASE_URL: &str = "DATABASE_URL";
    pub const CONFIG_PREFIX: &str = "BIZCORE";
}

pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Default log filter per environment
pub fn default_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        "test" => "warn",
        _ => "debug",
    }
}

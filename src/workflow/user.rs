use crate::error::{BizError, Result};
use serde::{Deserialize, Serialize};

/// The acting user of an operation, as supplied by the session layer.
pub trait UserContext: Send + Sync {
    fn user_id(&self) -> Option<i64>;

    fn display_name(&self) -> &str;

    fn org_unit_id(&self) -> Option<i64>;

    /// The user id, if the user is resolvable (a positive id).
    fn resolved_user_id(&self) -> Result<i64> {
        match self.user_id() {
            Some(id) if id > 0 => Ok(id),
            _ => Err(BizError::Validation(format!(
                "acting user '{}' is not resolvable",
                self.display_name()
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub user_id: Option<i64>,
    pub display_name: String,
    pub org_unit_id: Option<i64>,
}

impl SessionUser {
    pub fn new(user_id: i64, display_name: &str) -> Self {
        Self {
            user_id: Some(user_id),
            display_name: display_name.to_string(),
            org_unit_id: None,
        }
    }

    pub fn with_org_unit(mut self, org_unit_id: i64) -> Self {
        self.org_unit_id = Some(org_unit_id);
        self
    }

    /// Unauthenticated session; rejected by every write.
    pub fn anonymous() -> Self {
        Self {
            display_name: "anonymous".to_string(),
            ..Self::default()
        }
    }
}

impl UserContext for SessionUser {
    fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn org_unit_id(&self) -> Option<i64> {
        self.org_unit_id
    }
}

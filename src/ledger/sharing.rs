use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SharePermission {
    View,
    Edit,
}

/// Capability token granting access to a single budget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SharedBudget {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub share_token: String,
    pub created_by: Uuid,
    pub permission: SharePermission,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl SharedBudget {
    pub fn new(
        budget_id: Uuid,
        created_by: Uuid,
        permission: SharePermission,
        expires_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            budget_id,
            share_token: Uuid::new_v4().simple().to_string(),
            created_by,
            permission,
            expires_at,
            created_at,
        }
    }

    /// Expiry is only evaluated when the token is read.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| now >= expires)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    BudgetExceeded,
    LowBalance,
    GoalAchieved,
    RecurringDue,
    Custom,
}

/// A user-facing notification produced by the alert checks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
}

impl Alert {
    pub fn new(
        user_id: Uuid,
        kind: AlertKind,
        title: impl Into<String>,
        message: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            title: title.into(),
            message: message.into(),
            is_read: false,
            created_at,
            action_url: None,
        }
    }

    pub fn with_action(mut self, url: impl Into<String>) -> Self {
        self.action_url = Some(url.into());
        self
    }

    /// Two alerts describe the same condition when kind and title match.
    pub fn same_condition(&self, other: &Alert) -> bool {
        self.user_id == other.user_id && self.kind == other.kind && self.title == other.title
    }
}

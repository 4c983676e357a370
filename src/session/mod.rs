//! Who is using the ledger and which features their plan unlocks.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    #[default]
    Basic,
    Standard,
    Premium,
}

/// Capabilities gated by plan tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Transactions,
    Budgets,
    Goals,
    Recurring,
    Reports,
    Insights,
    Projections,
    Sharing,
    Templates,
}

impl Feature {
    /// Lowest plan that unlocks the feature.
    pub fn minimum_plan(self) -> Plan {
        match self {
            Feature::Transactions | Feature::Budgets => Plan::Basic,
            Feature::Goals | Feature::Recurring | Feature::Reports => Plan::Standard,
            Feature::Insights | Feature::Projections | Feature::Sharing | Feature::Templates => {
                Plan::Premium
            }
        }
    }
}

impl Plan {
    pub fn allows(self, feature: Feature) -> bool {
        self >= feature.minimum_plan()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub display_name: String,
    #[serde(default)]
    pub plan: Plan,
}

impl Session {
    pub fn new(display_name: impl Into<String>, plan: Plan) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            display_name: display_name.into(),
            plan,
        }
    }

    pub fn allows(&self, feature: Feature) -> bool {
        self.plan.allows(feature)
    }
}

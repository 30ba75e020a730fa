//! Mission and reward data.

use serde::{Deserialize, Serialize};

use super::common::EntityId;
use super::economy::Commodity;

/// Payout granted to a faction on mission completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Reward {
    Money { amount: i64 },
    /// Older saves spell this tag `relations`
    #[serde(alias = "relations")]
    Relation { faction: EntityId, amount: f64 },
}

impl Reward {
    pub fn kind(&self) -> RewardKind {
        match self {
            Reward::Money { .. } => RewardKind::Money,
            Reward::Relation { .. } => RewardKind::Relation,
        }
    }
}

/// Discriminant of [`Reward`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RewardKind {
    Money,
    Relation,
}

impl std::fmt::Display for RewardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RewardKind::Money => f.write_str("money"),
            RewardKind::Relation => f.write_str("relation"),
        }
    }
}

/// What must happen for a mission to complete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Objective {
    /// Target must no longer exist. The id is a weak reference: it is
    /// expected to dangle once the objective is met.
    Destroy { target: EntityId },
    /// Destination storage must hold at least `amount` of `commodity`
    Deliver {
        commodity: Commodity,
        amount: u64,
        to: EntityId,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    /// Faction receiving the rewards
    pub faction: EntityId,
    pub objective: Objective,
    #[serde(default)]
    pub rewards: Vec<Reward>,
    /// Simulated time after which the mission fails
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<f64>,
}

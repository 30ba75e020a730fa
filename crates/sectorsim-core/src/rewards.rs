//! Mission reward handlers.

pub use crate::components::{Reward, RewardKind};

use crate::components::{Budget, EntityId, Relations};
use crate::config::SimConfig;
use crate::error::{Result, SimError};
use crate::store::EntityStore;

/// Grants a reward to a faction
pub type RewardHandler = fn(&mut EntityStore, &SimConfig, EntityId, &Reward) -> Result<()>;

pub fn handler_for(kind: RewardKind) -> RewardHandler {
    match kind {
        RewardKind::Money => money,
        RewardKind::Relation => relation,
    }
}

impl Reward {
    /// Grant this reward to `faction`
    pub fn apply(&self, store: &mut EntityStore, config: &SimConfig, faction: EntityId) -> Result<()> {
        handler_for(self.kind())(store, config, faction, self)
    }
}

pub fn money(store: &mut EntityStore, _config: &SimConfig, faction: EntityId, reward: &Reward) -> Result<()> {
    let Reward::Money { amount } = reward else {
        return Err(SimError::WrongRewardKind {
            expected: RewardKind::Money,
            found: reward.kind(),
        });
    };
    store.component_mut::<Budget>(faction)?.money += amount;
    Ok(())
}

/// Shift the standing of `faction` toward another faction, clamped to the
/// configured limit
pub fn relation(store: &mut EntityStore, config: &SimConfig, faction: EntityId, reward: &Reward) -> Result<()> {
    let Reward::Relation { faction: other, amount } = reward else {
        return Err(SimError::WrongRewardKind {
            expected: RewardKind::Relation,
            found: reward.kind(),
        });
    };
    store.get_or_err(*other)?;

    let limit = config.relation_limit;
    let relations = store.component_mut::<Relations>(faction)?;
    let value = relations.values.entry(*other).or_insert(0.0);
    *value = (*value + amount).clamp(-limit, limit);
    Ok(())
}

//! Error taxonomy for the simulation core.

use thiserror::Error;

use crate::components::{EntityId, OrderKind, RewardKind};

/// Errors raised by the store, systems, cascades and the serializer.
#[derive(Debug, Error)]
pub enum SimError {
    /// An id resolved from a relationship field no longer points to a live entity.
    #[error("entity {id} does not exist")]
    MissingEntity { id: EntityId },

    /// A capability check failed: the entity lacks a required component.
    #[error("entity {id} is missing component `{component}`")]
    MissingComponent { id: EntityId, component: String },

    #[error("reward handler for `{expected}` received a `{found}` reward")]
    WrongRewardKind { expected: RewardKind, found: RewardKind },

    #[error("order handler for `{expected}` received a `{found}` order")]
    WrongOrderKind { expected: OrderKind, found: OrderKind },

    /// Snapshot failed validation; nothing was constructed.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// Unregistering the entity would leave dangling references.
    #[error("entity {id} is still referenced by entity {by}")]
    StillReferenced { id: EntityId, by: EntityId },

    /// The receiving storage cannot take the whole transfer.
    #[error("entity {id} needs {needed} free cargo units but has {free}")]
    InsufficientCapacity { id: EntityId, needed: u64, free: u64 },

    /// A headless run reported failure instead of a snapshot.
    #[error("headless run failed: {0}")]
    RunFailed(String),

    /// The other end of a worker channel hung up.
    #[error("worker channel disconnected")]
    Disconnected,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    pub(crate) fn missing_component(id: EntityId, component: impl Into<String>) -> Self {
        SimError::MissingComponent {
            id,
            component: component.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SimError>;

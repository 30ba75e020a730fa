//! Order queue components.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::common::{EntityId, Vec2};

/// One actionable intent of an entity. Carries only what is needed to
/// resume execution after a snapshot load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Order {
    /// Stay put until `until` (simulated seconds), or forever
    Hold {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        until: Option<f64>,
    },
    Move { position: Vec2 },
    Collect { target: EntityId },
    Attack { target: EntityId },
    Dock { target: EntityId },
    Mine { target: EntityId },
    Deliver { target: EntityId },
}

impl Order {
    pub fn kind(&self) -> OrderKind {
        match self {
            Order::Hold { .. } => OrderKind::Hold,
            Order::Move { .. } => OrderKind::Move,
            Order::Collect { .. } => OrderKind::Collect,
            Order::Attack { .. } => OrderKind::Attack,
            Order::Dock { .. } => OrderKind::Dock,
            Order::Mine { .. } => OrderKind::Mine,
            Order::Deliver { .. } => OrderKind::Deliver,
        }
    }

    /// Entity the order acts upon, if any
    pub fn target(&self) -> Option<EntityId> {
        match self {
            Order::Hold { .. } | Order::Move { .. } => None,
            Order::Collect { target }
            | Order::Attack { target }
            | Order::Dock { target }
            | Order::Mine { target }
            | Order::Deliver { target } => Some(*target),
        }
    }
}

/// Discriminant of [`Order`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderKind {
    Hold,
    Move,
    Collect,
    Attack,
    Dock,
    Mine,
    Deliver,
}

impl std::fmt::Display for OrderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OrderKind::Hold => "hold",
            OrderKind::Move => "move",
            OrderKind::Collect => "collect",
            OrderKind::Attack => "attack",
            OrderKind::Dock => "dock",
            OrderKind::Mine => "mine",
            OrderKind::Deliver => "deliver",
        };
        f.write_str(name)
    }
}

/// Pending orders; the front is the active order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Orders {
    #[serde(default)]
    pub queue: VecDeque<Order>,
}

impl Orders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn head(&self) -> Option<&Order> {
        self.queue.front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

/// Default behavior used when the order queue runs dry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AutoOrderBehavior {
    #[default]
    Hold,
    /// Stay close to the commander
    Escort,
    /// Mine the nearest asteroid, deliver to the nearest own facility
    Mine,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoOrder {
    pub behavior: AutoOrderBehavior,
}

impl AutoOrder {
    pub fn new(behavior: AutoOrderBehavior) -> Self {
        Self { behavior }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_json_is_tagged() {
        let order = Order::Collect { target: EntityId(4) };
        let json = serde_json::to_string(&order).unwrap();
        assert_eq!(json, r#"{"type":"collect","target":4}"#);

        let hold: Order = serde_json::from_str(r#"{"type":"hold"}"#).unwrap();
        assert_eq!(hold, Order::Hold { until: None });
    }

    #[test]
    fn test_order_target() {
        assert_eq!(Order::Mine { target: EntityId(2) }.target(), Some(EntityId(2)));
        assert_eq!(Order::Hold { until: Some(3.0) }.target(), None);
        assert_eq!(Order::Move { position: Vec2::ZERO }.kind(), OrderKind::Move);
    }
}

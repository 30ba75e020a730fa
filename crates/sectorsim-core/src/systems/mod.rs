//! Systems - logic that operates on components
//!
//! Run once per tick by `Sim::next`, in this order: auto-order, orders
//! (see [`crate::orders`]), production, missions.

mod auto_order;
mod missions;
mod production;

pub use auto_order::*;
pub use missions::*;
pub use production::*;

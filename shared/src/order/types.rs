//! Closed status and routing enums
//!
//! All enums reject unrecognized wire values at the serde boundary;
//! there is no catch-all variant.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order service type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderType {
    DineIn,
    Takeaway,
    Delivery,
}

/// Preparation station an item is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Station {
    Kitchen,
    Bar,
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Station::Kitchen => write!(f, "kitchen"),
            Station::Bar => write!(f, "bar"),
        }
    }
}

/// Order-level workflow status
///
/// Forward path: Pending → Preparing → Ready → Completed.
/// Cancelled is reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Completed and Cancelled admit no further transitions
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Item-level workflow status
///
/// Forward path: Pending → Preparing → Ready → Served. Voided is
/// reachable from Pending/Preparing (later only via explicit
/// override).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Pending,
    Preparing,
    Ready,
    Served,
    Voided,
}

impl ItemStatus {
    /// Served and Voided items no longer block order completion
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, ItemStatus::Served | ItemStatus::Voided)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Preparing => "preparing",
            ItemStatus::Ready => "ready",
            ItemStatus::Served => "served",
            ItemStatus::Voided => "voided",
        };
        write!(f, "{}", s)
    }
}

/// Who is asking for a transition
///
/// Station actors (kitchen, bar) may only touch items routed to their
/// own station. Waiters and admins operate on any item; serving and
/// voiding are floor operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Actor {
    Kitchen,
    Bar,
    Waiter,
    Admin,
}

impl Actor {
    /// The station this actor is bound to, if any
    pub fn station(&self) -> Option<Station> {
        match self {
            Actor::Kitchen => Some(Station::Kitchen),
            Actor::Bar => Some(Station::Bar),
            Actor::Waiter | Actor::Admin => None,
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Actor::Kitchen => "kitchen",
            Actor::Bar => "bar",
            Actor::Waiter => "waiter",
            Actor::Admin => "admin",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_type_wire_format() {
        assert_eq!(
            serde_json::to_string(&OrderType::DineIn).unwrap(),
            "\"dine-in\""
        );
        let t: OrderType = serde_json::from_str("\"takeaway\"").unwrap();
        assert_eq!(t, OrderType::Takeaway);
    }

    #[test]
    fn test_unknown_values_rejected() {
        assert!(serde_json::from_str::<OrderType>("\"drive-thru\"").is_err());
        assert!(serde_json::from_str::<OrderStatus>("\"paused\"").is_err());
        assert!(serde_json::from_str::<ItemStatus>("\"burnt\"").is_err());
        assert!(serde_json::from_str::<Station>("\"patio\"").is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Ready.is_terminal());

        assert!(ItemStatus::Served.is_terminal());
        assert!(ItemStatus::Voided.is_terminal());
        assert!(!ItemStatus::Ready.is_terminal());
    }

    #[test]
    fn test_actor_station() {
        assert_eq!(Actor::Kitchen.station(), Some(Station::Kitchen));
        assert_eq!(Actor::Bar.station(), Some(Station::Bar));
        assert_eq!(Actor::Waiter.station(), None);
        assert_eq!(Actor::Admin.station(), None);
    }

    #[test]
    fn test_actor_wire_format() {
        let a: Actor = serde_json::from_str(r#"{"role":"kitchen"}"#).unwrap();
        assert_eq!(a, Actor::Kitchen);
    }
}

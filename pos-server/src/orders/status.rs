//! Status transition engine
//!
//! Two explicit transition tables, checked before any state is
//! touched. A rejected transition is a pure error; the caller's
//! snapshot is untouched.
//!
//! ```text
//! Order:  Pending ──▶ Preparing ──▶ Ready ──▶ Completed
//!            │            │           │
//!            └────────────┴───────────┴─────▶ Cancelled
//!
//! Item:   Pending ──▶ Preparing ──▶ Ready ──▶ Served
//!            │            │
//!            └────────────┴─────▶ Voided   (later only via override)
//! ```
//!
//! Completion carries one extra precondition checked by the aggregate:
//! every item must be terminal (Served or Voided).

use shared::order::{Actor, ItemStatus, OrderStatus, Station};

use super::error::{OrderError, OrderResult};

/// Check an order-level transition against the table
pub fn check_order_transition(from: OrderStatus, to: OrderStatus) -> OrderResult<()> {
    use OrderStatus::*;

    let allowed = matches!(
        (from, to),
        (Pending, Preparing)
            | (Preparing, Ready)
            | (Ready, Completed)
            | (Pending, Cancelled)
            | (Preparing, Cancelled)
            | (Ready, Cancelled)
    );

    if allowed {
        Ok(())
    } else {
        Err(OrderError::InvalidOrderTransition { from, to })
    }
}

/// Check an item-level transition against the table
///
/// Voiding a Ready/Served item is deliberately absent here; that path
/// exists only as the explicit override in the aggregate.
pub fn check_item_transition(from: ItemStatus, to: ItemStatus) -> OrderResult<()> {
    use ItemStatus::*;

    let allowed = matches!(
        (from, to),
        (Pending, Preparing)
            | (Preparing, Ready)
            | (Ready, Served)
            | (Pending, Voided)
            | (Preparing, Voided)
    );

    if allowed {
        Ok(())
    } else {
        Err(OrderError::InvalidItemTransition { from, to })
    }
}

/// Station guard: kitchen/bar actors only touch their own items;
/// waiters and admins touch anything.
pub fn check_station(actor: Actor, station: Station) -> OrderResult<()> {
    match actor.station() {
        Some(s) if s != station => Err(OrderError::ForbiddenTransition { actor, station }),
        _ => Ok(()),
    }
}

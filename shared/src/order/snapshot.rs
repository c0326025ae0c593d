//! Persisted order state
//!
//! `OrderSnapshot` is the single at-rest and wire representation of an
//! order. Financial fields are always derived server-side; clients
//! never send them back authoritatively.

use serde::{Deserialize, Serialize};

use super::types::{ItemStatus, OrderStatus, OrderType, Station};
use crate::models::Lifecycle;

/// One line item on an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Server-assigned id, unique across all orders
    pub id: u64,
    /// Reference into the menu catalog
    pub menu_item_id: u64,
    /// Denormalized name for tickets and station screens
    pub name: String,
    /// Routing snapshot taken from the menu at add time
    pub station: Station,
    pub quantity: u32,
    /// Menu price at the moment the item was added; immutable afterwards
    pub price_at_time: f64,
    pub status: ItemStatus,
}

impl OrderItem {
    /// Voided items do not contribute to totals
    #[inline]
    pub fn is_billable(&self) -> bool {
        self.status != ItemStatus::Voided
    }
}

/// Full order state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    pub id: u64,
    /// Human-facing unique number, `ORD{yyyymmdd}{count}`
    pub order_number: String,
    /// Dine-in table, absent for takeaway/delivery
    pub table_number: Option<String>,
    pub order_type: OrderType,
    /// Reference to the waiter who opened the order
    pub waiter_id: Option<u64>,
    pub status: OrderStatus,
    /// Existence status, kept separate from workflow status
    pub lifecycle: Lifecycle,
    /// Insertion order doubles as ticket print order
    pub items: Vec<OrderItem>,
    pub subtotal: f64,
    pub tax_amount: f64,
    pub service_amount: f64,
    pub tip_amount: f64,
    pub total_amount: f64,
    pub payment_method: Option<String>,
    pub tax_number: Option<String>,
    /// Epoch millis
    pub created_at: i64,
    /// Epoch millis; bumped on every mutation, basis of the sync cursor
    pub updated_at: i64,
    /// Epoch millis, stamped when the order reaches Completed
    pub completed_at: Option<i64>,
}

impl OrderSnapshot {
    /// Find an item by id
    pub fn item(&self, item_id: u64) -> Option<&OrderItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    /// Find an item by id, mutably
    pub fn item_mut(&mut self, item_id: u64) -> Option<&mut OrderItem> {
        self.items.iter_mut().find(|i| i.id == item_id)
    }

    /// Ids of items that still block order completion
    pub fn non_terminal_items(&self) -> Vec<u64> {
        self.items
            .iter()
            .filter(|i| !i.status.is_terminal())
            .map(|i| i.id)
            .collect()
    }

    /// Mark the order changed at `now`
    pub fn touch(&mut self, now: i64) {
        self.updated_at = now;
    }

    /// Delay flag: an active order older than the threshold with items
    /// still in flight needs floor attention.
    pub fn is_delayed(&self, now: i64, threshold_minutes: i64) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        if self.non_terminal_items().is_empty() {
            return false;
        }
        now - self.created_at > threshold_minutes * 60_000
    }
}

/// List entry with the computed delay flag attached
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderListing {
    pub order: OrderSnapshot,
    pub delayed: bool,
}

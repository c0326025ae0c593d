//! Menu catalog snapshot

use serde::{Deserialize, Serialize};

use crate::order::Station;

/// What the order core needs to know about a menu item at add time
///
/// `price` and `station` are snapshotted onto the order item; later
/// menu edits never alter past orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItemInfo {
    pub id: u64,
    pub name: String,
    pub price: f64,
    pub station: Station,
}

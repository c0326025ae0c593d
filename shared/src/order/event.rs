//! Delta events pushed to station clients
//!
//! Every successful mutation produces one `OrderDelta`. The delta
//! carries the full post-mutation snapshot so a client can upsert it
//! blindly; `kind` only tells the client what changed so it can route
//! the update (station screens, floor view) and play the right cue.
//!
//! Delivery is at-most-once per connection. A client that misses
//! events reconciles through the sync endpoint on reconnect.

use serde::{Deserialize, Serialize};

use super::snapshot::OrderSnapshot;
use super::types::{ItemStatus, OrderStatus, Station};
use crate::models::Lifecycle;

/// What a delta describes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeltaKind {
    OrderCreated,
    OrderStatusChanged {
        from: OrderStatus,
        to: OrderStatus,
    },
    ItemsAdded {
        item_ids: Vec<u64>,
    },
    ItemRemoved {
        item_id: u64,
    },
    ItemStatusChanged {
        item_id: u64,
        station: Station,
        from: ItemStatus,
        to: ItemStatus,
    },
    /// A Ready/Served item was voided through the override path
    ItemVoidOverridden {
        item_id: u64,
        station: Station,
    },
    PaymentUpdated,
}

/// One order mutation, as broadcast to the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDelta {
    pub order_id: u64,
    pub order_number: String,
    pub waiter_id: Option<u64>,
    /// Post-mutation `updated_at`; clients merge last-write-wins on this
    pub updated_at: i64,
    pub kind: DeltaKind,
    /// Full post-mutation state, upserted by order id
    pub order: OrderSnapshot,
}

impl OrderDelta {
    /// True when the delta is an order-level status change
    pub fn is_order_status_change(&self) -> bool {
        matches!(
            self.kind,
            DeltaKind::OrderStatusChanged { .. } | DeltaKind::OrderCreated
        )
    }

    /// Stations that must see this delta
    ///
    /// Item-level deltas target the item's station; order-level deltas
    /// target every station with a billable item on the ticket.
    pub fn stations(&self) -> Vec<Station> {
        match &self.kind {
            DeltaKind::ItemStatusChanged { station, .. }
            | DeltaKind::ItemVoidOverridden { station, .. } => vec![*station],
            DeltaKind::ItemsAdded { item_ids } => {
                let mut stations: Vec<Station> = self
                    .order
                    .items
                    .iter()
                    .filter(|i| item_ids.contains(&i.id))
                    .map(|i| i.station)
                    .collect();
                stations.dedup();
                stations
            }
            _ => {
                let mut stations: Vec<Station> = self
                    .order
                    .items
                    .iter()
                    .filter(|i| i.is_billable())
                    .map(|i| i.station)
                    .collect();
                stations.sort_by_key(|s| *s as u8);
                stations.dedup();
                stations
            }
        }
    }
}

/// Collaborator event: a user record changed (rename, role change,
/// soft delete). Admin screens refresh their staff list from this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
    pub id: u64,
    pub name: String,
    pub role: String,
    pub lifecycle: Lifecycle,
    pub updated_at: i64,
}

/// Envelope pushed over a gateway connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum GatewayEvent {
    OrderUpdate(OrderDelta),
    UserUpdate(UserUpdate),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OrderItem, OrderType};

    fn delta_with(kind: DeltaKind) -> OrderDelta {
        let order = OrderSnapshot {
            id: 5,
            order_number: "ORD202508300005".to_string(),
            table_number: None,
            order_type: OrderType::Takeaway,
            waiter_id: Some(3),
            status: OrderStatus::Pending,
            lifecycle: Lifecycle::Active,
            items: vec![
                OrderItem {
                    id: 50,
                    menu_item_id: 1,
                    name: "Espresso".to_string(),
                    station: Station::Bar,
                    quantity: 1,
                    price_at_time: 1.50,
                    status: ItemStatus::Pending,
                },
                OrderItem {
                    id: 51,
                    menu_item_id: 2,
                    name: "Club Sandwich".to_string(),
                    station: Station::Kitchen,
                    quantity: 1,
                    price_at_time: 8.00,
                    status: ItemStatus::Pending,
                },
            ],
            subtotal: 9.5,
            tax_amount: 0.95,
            service_amount: 0.48,
            tip_amount: 0.0,
            total_amount: 10.93,
            payment_method: None,
            tax_number: None,
            created_at: 0,
            updated_at: 1,
            completed_at: None,
        };
        OrderDelta {
            order_id: order.id,
            order_number: order.order_number.clone(),
            waiter_id: order.waiter_id,
            updated_at: order.updated_at,
            kind,
            order,
        }
    }

    #[test]
    fn test_item_delta_targets_one_station() {
        let delta = delta_with(DeltaKind::ItemStatusChanged {
            item_id: 50,
            station: Station::Bar,
            from: ItemStatus::Pending,
            to: ItemStatus::Preparing,
        });
        assert_eq!(delta.stations(), vec![Station::Bar]);
        assert!(!delta.is_order_status_change());
    }

    #[test]
    fn test_order_delta_targets_all_stations() {
        let delta = delta_with(DeltaKind::OrderCreated);
        let stations = delta.stations();
        assert!(stations.contains(&Station::Kitchen));
        assert!(stations.contains(&Station::Bar));
        assert!(delta.is_order_status_change());
    }

    #[test]
    fn test_items_added_targets_added_stations_only() {
        let delta = delta_with(DeltaKind::ItemsAdded { item_ids: vec![51] });
        assert_eq!(delta.stations(), vec![Station::Kitchen]);
    }

    #[test]
    fn test_gateway_event_wire_shape() {
        let delta = delta_with(DeltaKind::PaymentUpdated);
        let json = serde_json::to_string(&GatewayEvent::OrderUpdate(delta)).unwrap();
        assert!(json.contains("\"type\":\"order_update\""));
        assert!(json.contains("\"payload\""));
    }
}

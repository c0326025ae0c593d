//! WebSocket gateway
//!
//! Terminals hold one persistent connection each. The first frame a
//! client sends declares its scope (kitchen, bar, waiter or admin);
//! the server answers with a welcome frame carrying the sync epoch,
//! then pushes the [`GatewayEvent`]s that scope is entitled to see.
//!
//! Scope filtering:
//! - admin sees everything, including user updates
//! - kitchen/bar see order-level status changes plus item deltas for
//!   their own station
//! - a waiter sees every delta of their own orders plus order-level
//!   status changes of all orders
//!
//! Push is best-effort. A client whose buffer is full loses the event
//! and reconciles through the sync endpoint, the same way it would
//! after a reconnect.

use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use dashmap::DashMap;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use shared::order::{GatewayEvent, Station};

use crate::core::ServerState;

/// What a connected client is entitled to see
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ClientScope {
    Kitchen,
    Bar,
    Waiter { waiter_id: u64 },
    Admin,
}

impl ClientScope {
    fn station(&self) -> Option<Station> {
        match self {
            ClientScope::Kitchen => Some(Station::Kitchen),
            ClientScope::Bar => Some(Station::Bar),
            _ => None,
        }
    }

    /// Scope filter applied to every event before push
    pub fn wants(&self, event: &GatewayEvent) -> bool {
        match event {
            GatewayEvent::UserUpdate(_) => matches!(self, ClientScope::Admin),
            GatewayEvent::OrderUpdate(delta) => match self {
                ClientScope::Admin => true,
                ClientScope::Waiter { waiter_id } => {
                    delta.waiter_id == Some(*waiter_id) || delta.is_order_status_change()
                }
                ClientScope::Kitchen | ClientScope::Bar => {
                    delta.is_order_status_change()
                        || self
                            .station()
                            .is_some_and(|s| delta.stations().contains(&s))
                }
            },
        }
    }
}

struct ConnectedClient {
    scope: ClientScope,
    tx: mpsc::Sender<GatewayEvent>,
}

/// Connection registry and fan-out point
pub struct Gateway {
    clients: DashMap<u64, ConnectedClient>,
    next_id: AtomicU64,
    epoch: Uuid,
    buffer: usize,
}

impl Gateway {
    pub fn new(epoch: Uuid, buffer: usize) -> Self {
        Self {
            clients: DashMap::new(),
            next_id: AtomicU64::new(1),
            epoch,
            buffer,
        }
    }

    pub fn epoch(&self) -> Uuid {
        self.epoch
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Attach a client push channel; returns the connection id
    pub fn register(&self, scope: ClientScope, tx: mpsc::Sender<GatewayEvent>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.clients.insert(id, ConnectedClient { scope, tx });
        tracing::info!(client_id = id, ?scope, "Gateway client connected");
        id
    }

    pub fn unregister(&self, client_id: u64) {
        self.clients.remove(&client_id);
        tracing::info!(client_id, "Gateway client disconnected");
    }

    /// Push one event to every connected client whose scope wants it
    pub fn dispatch(&self, event: &GatewayEvent) {
        for client in self.clients.iter() {
            if !client.scope.wants(event) {
                continue;
            }
            if let Err(e) = client.tx.try_send(event.clone()) {
                // Slow consumer; it will catch up through sync
                tracing::warn!(client_id = *client.key(), "Dropping event for client: {}", e);
            }
        }
    }

    /// Consume the broadcaster feed until the order core shuts down
    pub fn start_dispatch(self: Arc<Self>, mut rx: broadcast::Receiver<GatewayEvent>) {
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => self.dispatch(&event),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "Gateway dispatch lagged behind");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            tracing::info!("Gateway dispatch loop stopped");
        });
    }
}

/// First frame the server sends after a successful subscribe
#[derive(Debug, Serialize, Deserialize)]
pub struct Welcome {
    pub r#type: String,
    pub server_epoch: String,
}

pub fn router() -> Router<ServerState> {
    Router::new().route("/ws", get(handle_ws))
}

/// GET /ws — upgrade to WebSocket
async fn handle_ws(State(state): State<ServerState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state.gateway.clone()))
}

async fn handle_connection(socket: WebSocket, gateway: Arc<Gateway>) {
    let (mut ws_sink, mut ws_stream) = socket.split();

    // First frame declares the client's scope
    let scope = match ws_stream.next().await {
        Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientScope>(text.as_str()) {
            Ok(scope) => scope,
            Err(e) => {
                tracing::warn!("Rejecting WS client, bad subscribe frame: {}", e);
                let _ = ws_sink.close().await;
                return;
            }
        },
        _ => {
            tracing::warn!("Rejecting WS client, no subscribe frame");
            let _ = ws_sink.close().await;
            return;
        }
    };

    let welcome = Welcome {
        r#type: "welcome".to_string(),
        server_epoch: gateway.epoch().to_string(),
    };
    if let Ok(json) = serde_json::to_string(&welcome)
        && ws_sink.send(Message::Text(json.into())).await.is_err()
    {
        tracing::warn!("Failed to send welcome, disconnecting");
        return;
    }

    let (tx, mut rx) = mpsc::channel::<GatewayEvent>(gateway.buffer);
    let client_id = gateway.register(scope, tx);

    loop {
        tokio::select! {
            // Event to push to this client
            event = rx.recv() => {
                match event {
                    Some(event) => {
                        if let Ok(json) = serde_json::to_string(&event)
                            && ws_sink.send(Message::Text(json.into())).await.is_err()
                        {
                            tracing::warn!(client_id, "Failed to push event via WS");
                            break;
                        }
                    }
                    None => break, // gateway dropped the client
                }
            }

            // Incoming frame from the client
            msg = ws_stream.next() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        let _ = ws_sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::warn!(client_id, "WebSocket error: {}", e);
                        break;
                    }
                    _ => {} // Text after subscribe, Binary, Pong — ignore
                }
            }
        }
    }

    let _ = ws_sink.close().await;
    gateway.unregister(client_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Lifecycle;
    use shared::order::{
        DeltaKind, ItemStatus, OrderDelta, OrderItem, OrderSnapshot, OrderStatus, OrderType,
        UserUpdate,
    };

    fn delta(kind: DeltaKind, waiter_id: Option<u64>) -> GatewayEvent {
        let order = OrderSnapshot {
            id: 1,
            order_number: "ORD202508300001".into(),
            table_number: None,
            order_type: OrderType::DineIn,
            waiter_id,
            status: OrderStatus::Pending,
            lifecycle: Lifecycle::Active,
            items: vec![OrderItem {
                id: 10,
                menu_item_id: 1,
                name: "Margherita".into(),
                station: Station::Kitchen,
                quantity: 1,
                price_at_time: 9.5,
                status: ItemStatus::Pending,
            }],
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
        GatewayEvent::OrderUpdate(OrderDelta {
            order_id: 1,
            order_number: order.order_number.clone(),
            waiter_id,
            updated_at: 1,
            kind,
            order,
        })
    }

    fn kitchen_item_delta(waiter_id: Option<u64>) -> GatewayEvent {
        delta(
            DeltaKind::ItemStatusChanged {
                item_id: 10,
                station: Station::Kitchen,
                from: ItemStatus::Pending,
                to: ItemStatus::Preparing,
            },
            waiter_id,
        )
    }

    #[test]
    fn test_station_scope_filtering() {
        let event = kitchen_item_delta(Some(3));
        assert!(ClientScope::Kitchen.wants(&event));
        assert!(!ClientScope::Bar.wants(&event));
        assert!(ClientScope::Admin.wants(&event));

        // order-level changes reach both stations
        let event = delta(
            DeltaKind::OrderStatusChanged {
                from: OrderStatus::Pending,
                to: OrderStatus::Preparing,
            },
            Some(3),
        );
        assert!(ClientScope::Kitchen.wants(&event));
        assert!(ClientScope::Bar.wants(&event));
    }

    #[test]
    fn test_waiter_scope_filtering() {
        // own order: every delta
        let own = kitchen_item_delta(Some(3));
        assert!(ClientScope::Waiter { waiter_id: 3 }.wants(&own));

        // someone else's order: only order-level changes
        let other = kitchen_item_delta(Some(9));
        assert!(!ClientScope::Waiter { waiter_id: 3 }.wants(&other));
        let other_status = delta(
            DeltaKind::OrderStatusChanged {
                from: OrderStatus::Preparing,
                to: OrderStatus::Ready,
            },
            Some(9),
        );
        assert!(ClientScope::Waiter { waiter_id: 3 }.wants(&other_status));
    }

    #[test]
    fn test_user_updates_are_admin_only() {
        let event = GatewayEvent::UserUpdate(UserUpdate {
            id: 1,
            name: "Ana".into(),
            role: "waiter".into(),
            lifecycle: Lifecycle::Active,
            updated_at: 1,
        });
        assert!(ClientScope::Admin.wants(&event));
        assert!(!ClientScope::Kitchen.wants(&event));
        assert!(!ClientScope::Bar.wants(&event));
        assert!(!ClientScope::Waiter { waiter_id: 1 }.wants(&event));
    }

    #[test]
    fn test_subscribe_frame_shape() {
        let scope: ClientScope = serde_json::from_str(r#"{"role":"kitchen"}"#).unwrap();
        assert_eq!(scope, ClientScope::Kitchen);
        let scope: ClientScope =
            serde_json::from_str(r#"{"role":"waiter","waiter_id":7}"#).unwrap();
        assert_eq!(scope, ClientScope::Waiter { waiter_id: 7 });
        assert!(serde_json::from_str::<ClientScope>(r#"{"role":"ghost"}"#).is_err());
    }

    #[tokio::test]
    async fn test_dispatch_routes_by_scope() {
        let gateway = Gateway::new(Uuid::new_v4(), 8);
        let (kitchen_tx, mut kitchen_rx) = mpsc::channel(8);
        let (bar_tx, mut bar_rx) = mpsc::channel(8);
        gateway.register(ClientScope::Kitchen, kitchen_tx);
        gateway.register(ClientScope::Bar, bar_tx);
        assert_eq!(gateway.client_count(), 2);

        gateway.dispatch(&kitchen_item_delta(None));

        assert!(kitchen_rx.recv().await.is_some());
        assert!(bar_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unregister_stops_delivery() {
        let gateway = Gateway::new(Uuid::new_v4(), 8);
        let (tx, mut rx) = mpsc::channel(8);
        let id = gateway.register(ClientScope::Admin, tx);
        gateway.unregister(id);
        assert_eq!(gateway.client_count(), 0);

        gateway.dispatch(&kitchen_item_delta(None));
        assert!(rx.try_recv().is_err());
    }
}

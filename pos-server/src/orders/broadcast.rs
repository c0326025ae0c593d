//! Event broadcaster
//!
//! Mutations publish deltas through the [`Broadcaster`] trait; the
//! production implementation fans out over a `tokio::sync::broadcast`
//! channel consumed by the WebSocket gateway. Emission is
//! fire-and-forget: a failed send is logged and swallowed, never
//! surfaced to the client whose mutation succeeded. Clients that miss
//! events reconcile through sync on reconnect.

use tokio::sync::broadcast;

use shared::order::{GatewayEvent, OrderDelta, UserUpdate};

/// Fan-out seam between the order core and the gateway
pub trait Broadcaster: Send + Sync {
    fn emit_order_update(&self, delta: &OrderDelta);
    fn emit_user_update(&self, update: &UserUpdate);
}

/// Production broadcaster backed by a tokio broadcast channel
pub struct ChannelBroadcaster {
    tx: broadcast::Sender<GatewayEvent>,
}

impl ChannelBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe a new gateway consumer
    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.tx.subscribe()
    }

    fn send(&self, event: GatewayEvent) {
        // SendError only means there is no receiver right now; the
        // mutation itself already succeeded.
        if let Err(e) = self.tx.send(event) {
            tracing::warn!("Dropping gateway event, no subscribers: {}", e);
        }
    }
}

impl Broadcaster for ChannelBroadcaster {
    fn emit_order_update(&self, delta: &OrderDelta) {
        tracing::debug!(
            order_id = delta.order_id,
            kind = ?delta.kind,
            "Broadcasting order delta"
        );
        self.send(GatewayEvent::OrderUpdate(delta.clone()));
    }

    fn emit_user_update(&self, update: &UserUpdate) {
        tracing::debug!(user_id = update.id, "Broadcasting user update");
        self.send(GatewayEvent::UserUpdate(update.clone()));
    }
}

/// No-op broadcaster for tests
pub struct NoopBroadcaster;

impl Broadcaster for NoopBroadcaster {
    fn emit_order_update(&self, _delta: &OrderDelta) {}
    fn emit_user_update(&self, _update: &UserUpdate) {}
}

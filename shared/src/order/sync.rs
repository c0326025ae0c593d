//! Delta-sync envelopes
//!
//! A client tracks the highest `updated_at` it has applied and asks
//! for everything strictly newer. The response's `server_epoch` is a
//! UUID minted at server startup; when it changes between polls the
//! client discards its cursor and full-syncs.

use serde::{Deserialize, Serialize};

use super::snapshot::OrderSnapshot;

/// Query parameters of `GET /api/orders/sync`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncQuery {
    /// Highest `updated_at` (epoch millis) the client has applied.
    /// Absent or 0 requests a full sync.
    pub cursor: Option<i64>,
}

/// Response of `GET /api/orders/sync`
///
/// Orders are sorted ascending by `updated_at`; a client applying them
/// in sequence never regresses an order. Merge contract: upsert by
/// order id, last-write-wins on `updated_at`, so re-delivery is
/// idempotent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResponse {
    pub orders: Vec<OrderSnapshot>,
    /// Cursor for the next poll; equals the request cursor when
    /// nothing changed
    pub next_cursor: i64,
    /// Startup UUID; a change signals a server restart
    pub server_epoch: String,
    /// True when the response is a bounded full sync rather than a delta
    pub full_sync: bool,
}

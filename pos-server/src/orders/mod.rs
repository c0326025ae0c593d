//! Order core - state machine, totals, persistence, sync, broadcast
//!
//! # Architecture
//!
//! ```text
//! HTTP handler
//!      │
//!      ▼
//! OrderService ──── per-order async lock (DashMap)
//!      │
//!      ├─▶ OrderAggregate ──▶ status (transition tables)
//!      │        │
//!      │        └─▶ money (decimal totals)
//!      │
//!      ├─▶ OrderStorage (redb, updated_at index)
//!      │
//!      └─▶ Broadcaster ──▶ gateway fan-out
//!
//! SyncService reads the updated_at index for delta queries.
//! ```
//!
//! Every mutation runs the same pipeline: lock the order, load the
//! snapshot, apply the change through the aggregate, recompute totals,
//! persist in one transaction, then emit the delta. Broadcast failure
//! never fails the mutation.

pub mod aggregate;
pub mod broadcast;
pub mod error;
pub mod money;
pub mod service;
pub mod status;
pub mod storage;
pub mod sync;

pub use aggregate::OrderAggregate;
pub use broadcast::{Broadcaster, ChannelBroadcaster, NoopBroadcaster};
pub use error::{OrderError, OrderResult};
pub use service::{
    AddItemsRequest, CreateOrderRequest, OrderItemInput, OrderService, UpdateOrderRequest,
};
pub use storage::{OrderStorage, StorageError, StorageResult};
pub use sync::SyncService;

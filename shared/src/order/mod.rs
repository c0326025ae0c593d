//! Order wire model
//!
//! The order snapshot, its status enums, the delta events pushed over
//! the gateway and the sync envelopes. Status semantics (which
//! transitions are legal) live server-side; these types only carry
//! state.

mod event;
mod snapshot;
mod sync;
mod types;

pub use event::{DeltaKind, GatewayEvent, OrderDelta, UserUpdate};
pub use snapshot::{OrderItem, OrderListing, OrderSnapshot};
pub use sync::{SyncQuery, SyncResponse};
pub use types::{Actor, ItemStatus, OrderStatus, OrderType, Station};

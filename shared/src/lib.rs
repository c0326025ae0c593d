//! Shared types for the comanda POS order core
//!
//! Everything that crosses a process boundary lives here: the order
//! snapshot and its status enums, delta events pushed to station
//! clients, sync request/response envelopes, collaborator snapshots
//! (settings, menu items, users) and the unified error code system
//! with HTTP mapping.

pub mod error;
pub mod models;
pub mod order;
pub mod util;

// Re-export the common error surface at the crate root
pub use error::{ApiResponse, AppError, AppResult, ErrorCode};

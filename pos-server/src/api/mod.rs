//! HTTP API modules
//!
//! Each module exposes a `router()` merged by `core::server::build_app`.

pub mod health;
pub mod orders;
pub mod users;

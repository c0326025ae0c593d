//! Order API module
//!
//! All mutations go through `OrderService`; handlers only translate
//! between HTTP and the service types.

mod handler;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create).get(handler::list))
        // Delta sync for reconnecting terminals
        .route("/sync", get(handler::sync))
        .route("/{id}", get(handler::get_by_id).put(handler::update))
        .route("/{id}/items", post(handler::add_items))
        .route("/{id}/items/{item_id}", delete(handler::remove_item))
        .route(
            "/{id}/items/{item_id}/status",
            put(handler::update_item_status),
        )
}

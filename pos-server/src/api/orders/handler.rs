//! Order API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    extract::rejection::JsonRejection,
};
use serde::Deserialize;

use shared::error::{AppError, AppResult};
use shared::order::{
    Actor, ItemStatus, OrderListing, OrderSnapshot, SyncQuery, SyncResponse,
};

use crate::core::ServerState;
use crate::orders::{AddItemsRequest, CreateOrderRequest, UpdateOrderRequest};

/// POST /api/orders — create an order with its initial items
pub async fn create(
    State(state): State<ServerState>,
    Json(req): Json<CreateOrderRequest>,
) -> AppResult<Json<OrderSnapshot>> {
    let order = state.orders.create_order(req).await?;
    Ok(Json(order))
}

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Include terminal orders (bounded reporting scan)
    #[serde(default)]
    pub all: bool,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    200
}

/// GET /api/orders — active orders with the delayed flag; `?all=true`
/// adds terminal orders up to `limit`
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<OrderListing>>> {
    let orders = if query.all {
        state.orders.list_all_orders(query.limit).await?
    } else {
        state.orders.list_orders().await?
    };
    Ok(Json(orders))
}

/// GET /api/orders/sync?cursor= — delta sync
pub async fn sync(
    State(state): State<ServerState>,
    Query(query): Query<SyncQuery>,
) -> AppResult<Json<SyncResponse>> {
    let response = state.sync.sync(&query)?;
    Ok(Json(response))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
) -> AppResult<Json<OrderSnapshot>> {
    let order = state.orders.get_order(id).await?;
    Ok(Json(order))
}

/// PUT /api/orders/{id} — payment fields and/or status.
///
/// The request type denies unknown fields, so a payload smuggling an
/// `items` array comes back as a 400 instead of silently bypassing the
/// item endpoints.
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
    payload: Result<Json<UpdateOrderRequest>, JsonRejection>,
) -> AppResult<Json<OrderSnapshot>> {
    let Json(req) = payload.map_err(|e| AppError::invalid_request(e.body_text()))?;
    let order = state.orders.update_order(id, req).await?;
    Ok(Json(order))
}

/// POST /api/orders/{id}/items — append items
pub async fn add_items(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
    Json(req): Json<AddItemsRequest>,
) -> AppResult<Json<OrderSnapshot>> {
    let order = state.orders.add_items(id, req).await?;
    Ok(Json(order))
}

/// DELETE /api/orders/{id}/items/{item_id} — remove a pending item
pub async fn remove_item(
    State(state): State<ServerState>,
    Path((id, item_id)): Path<(u64, u64)>,
) -> AppResult<Json<OrderSnapshot>> {
    let order = state.orders.remove_item(id, item_id).await?;
    Ok(Json(order))
}

/// Body of PUT /api/orders/{id}/items/{item_id}/status
///
/// The actor flattens in as `"role"`; `override` escalates a void of a
/// Ready/Served item to the override path (floor staff only).
#[derive(Debug, Deserialize)]
pub struct ItemStatusRequest {
    pub status: ItemStatus,
    #[serde(flatten)]
    pub actor: Actor,
    #[serde(default, rename = "override")]
    pub override_void: bool,
}

/// PUT /api/orders/{id}/items/{item_id}/status
pub async fn update_item_status(
    State(state): State<ServerState>,
    Path((id, item_id)): Path<(u64, u64)>,
    Json(req): Json<ItemStatusRequest>,
) -> AppResult<Json<OrderSnapshot>> {
    let order = if req.status == ItemStatus::Voided && req.override_void {
        state
            .orders
            .void_item_override(id, item_id, req.actor)
            .await?
    } else {
        state
            .orders
            .transition_item(id, item_id, req.status, req.actor)
            .await?
    };
    Ok(Json(order))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_status_request_shape() {
        let req: ItemStatusRequest =
            serde_json::from_str(r#"{"status":"preparing","role":"kitchen"}"#).unwrap();
        assert_eq!(req.status, ItemStatus::Preparing);
        assert_eq!(req.actor, Actor::Kitchen);
        assert!(!req.override_void);

        let req: ItemStatusRequest =
            serde_json::from_str(r#"{"status":"voided","role":"waiter","override":true}"#)
                .unwrap();
        assert!(req.override_void);
        assert_eq!(req.actor, Actor::Waiter);
    }
}

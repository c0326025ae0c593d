//! Order core error taxonomy

use thiserror::Error;

use shared::error::{AppError, ErrorCode};
use shared::order::{Actor, ItemStatus, OrderStatus, Station};

use super::storage::StorageError;

/// Errors produced by the order service and aggregate
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    OrderNotFound(u64),

    #[error("Item not found: {0}")]
    ItemNotFound(u64),

    #[error("Menu item not found: {0}")]
    MenuItemNotFound(u64),

    #[error("Order status transition not allowed: {from} -> {to}")]
    InvalidOrderTransition { from: OrderStatus, to: OrderStatus },

    #[error("Item status transition not allowed: {from} -> {to}")]
    InvalidItemTransition { from: ItemStatus, to: ItemStatus },

    #[error("{actor} cannot modify a {station} item")]
    ForbiddenTransition { actor: Actor, station: Station },

    #[error("Order has items that are not served or voided")]
    ItemsNotTerminal { pending_items: Vec<u64> },

    /// Mutation attempted against a Completed/Cancelled order
    #[error("Order is already {0}")]
    OrderClosed(OrderStatus),

    #[error("Only pending items can be removed, item is {0}")]
    ItemNotRemovable(ItemStatus),

    #[error("Order must contain at least one item")]
    EmptyOrder,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Could not acquire order lock in time")]
    LockTimeout,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type OrderResult<T> = Result<T, OrderError>;

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::OrderNotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, format!("Order {} not found", id))
                    .with_detail("order_id", id)
            }
            OrderError::ItemNotFound(id) => AppError::with_message(
                ErrorCode::OrderItemNotFound,
                format!("Item {} not found", id),
            )
            .with_detail("item_id", id),
            OrderError::MenuItemNotFound(id) => AppError::with_message(
                ErrorCode::MenuItemNotFound,
                format!("Menu item {} not found", id),
            )
            .with_detail("menu_item_id", id),
            OrderError::InvalidOrderTransition { from, to } => {
                AppError::with_message(ErrorCode::InvalidTransition, err_transition(&from, &to))
                    .with_detail("from", from.to_string())
                    .with_detail("to", to.to_string())
            }
            OrderError::InvalidItemTransition { from, to } => {
                AppError::with_message(ErrorCode::InvalidTransition, err_transition(&from, &to))
                    .with_detail("from", from.to_string())
                    .with_detail("to", to.to_string())
            }
            OrderError::ForbiddenTransition { actor, station } => AppError::with_message(
                ErrorCode::StationMismatch,
                format!("{} cannot modify a {} item", actor, station),
            )
            .with_detail("actor", actor.to_string())
            .with_detail("station", station.to_string()),
            OrderError::ItemsNotTerminal { pending_items } => AppError::new(
                ErrorCode::ItemsNotTerminal,
            )
            .with_detail(
                "pending_items",
                serde_json::Value::from(pending_items.clone()),
            ),
            OrderError::OrderClosed(status) => {
                let code = match status {
                    OrderStatus::Cancelled => ErrorCode::OrderAlreadyCancelled,
                    _ => ErrorCode::OrderAlreadyCompleted,
                };
                AppError::with_message(code, format!("Order is already {}", status))
            }
            OrderError::ItemNotRemovable(status) => AppError::with_message(
                ErrorCode::ItemNotRemovable,
                format!("Only pending items can be removed, item is {}", status),
            ),
            OrderError::EmptyOrder => AppError::new(ErrorCode::OrderEmpty),
            OrderError::Validation(msg) => AppError::validation(msg),
            OrderError::LockTimeout => AppError::new(ErrorCode::OrderBusy),
            OrderError::Storage(e) => AppError::database(e.to_string()),
        }
    }
}

fn err_transition(from: &impl std::fmt::Display, to: &impl std::fmt::Display) -> String {
    format!("Transition {} -> {} is not allowed", from, to)
}

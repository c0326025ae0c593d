//! HTTP status mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Map this error code to an HTTP status code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // General
            ErrorCode::Success => StatusCode::OK,
            ErrorCode::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::AlreadyExists => StatusCode::CONFLICT,
            ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorCode::ValueOutOfRange => StatusCode::BAD_REQUEST,

            // Permission
            ErrorCode::PermissionDenied => StatusCode::FORBIDDEN,
            ErrorCode::StationMismatch => StatusCode::FORBIDDEN,

            // Order
            ErrorCode::OrderNotFound => StatusCode::NOT_FOUND,
            ErrorCode::OrderAlreadyCompleted => StatusCode::CONFLICT,
            ErrorCode::OrderAlreadyCancelled => StatusCode::CONFLICT,
            ErrorCode::OrderItemNotFound => StatusCode::NOT_FOUND,
            ErrorCode::OrderEmpty => StatusCode::BAD_REQUEST,
            ErrorCode::InvalidTransition => StatusCode::CONFLICT,
            ErrorCode::ItemsNotTerminal => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::ItemNotRemovable => StatusCode::CONFLICT,
            ErrorCode::MenuItemNotFound => StatusCode::NOT_FOUND,

            // User
            ErrorCode::UserNotFound => StatusCode::NOT_FOUND,

            // System
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::TimeoutError => StatusCode::GATEWAY_TIMEOUT,
            ErrorCode::ConfigError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::OrderBusy => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::SystemBusy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

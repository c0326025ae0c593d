//! Unified error system
//!
//! Error codes, categories, the `AppError` application error type and
//! the `ApiResponse` envelope returned by every HTTP endpoint.

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};

//! Staff records
//!
//! Minimal user management: create, patch, soft delete. Deleting a
//! user flips the lifecycle flag instead of removing the row, so old
//! orders keep resolving their waiter id. Every change goes out as a
//! [`UserUpdate`] through the broadcaster; admin screens refresh
//! their staff list from it.

pub mod storage;

use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use validator::Validate;

use shared::error::{AppError, ErrorCode};
use shared::models::{Lifecycle, UserRecord};
use shared::order::UserUpdate;
use shared::util::now_millis;

use crate::orders::broadcast::Broadcaster;
use crate::orders::storage::StorageError;

pub use storage::UserStore;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    UserNotFound(u64),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::UserNotFound(id) => {
                AppError::with_message(ErrorCode::UserNotFound, format!("User {} not found", id))
                    .with_detail("user_id", id)
            }
            UserError::Validation(msg) => AppError::validation(msg),
            UserError::Storage(e) => AppError::database(e.to_string()),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 64, message = "Name must be 1-64 characters"))]
    pub name: String,
    #[validate(length(min = 1, message = "Role is required"))]
    pub role: String,
}

/// Patch-style update; `lifecycle: deleted` is the soft delete
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 64, message = "Name must be 1-64 characters"))]
    pub name: Option<String>,
    pub role: Option<String>,
    pub lifecycle: Option<Lifecycle>,
}

pub struct UserService {
    store: UserStore,
    broadcaster: Arc<dyn Broadcaster>,
}

impl UserService {
    pub fn new(store: UserStore, broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self { store, broadcaster }
    }

    fn emit(&self, user: &UserRecord) {
        self.broadcaster.emit_user_update(&UserUpdate {
            id: user.id,
            name: user.name.clone(),
            role: user.role.clone(),
            lifecycle: user.lifecycle,
            updated_at: user.updated_at,
        });
    }

    pub fn create_user(&self, req: CreateUserRequest) -> UserResult<UserRecord> {
        req.validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let txn = self.store.begin_write()?;
        let id = self.store.next_user_id(&txn)?;
        let user = UserRecord {
            id,
            name: req.name,
            role: req.role,
            lifecycle: Lifecycle::Active,
            updated_at: now_millis(),
        };
        self.store.store_user(&txn, &user)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(user_id = id, name = %user.name, "User created");
        self.emit(&user);
        Ok(user)
    }

    pub fn update_user(&self, user_id: u64, req: UpdateUserRequest) -> UserResult<UserRecord> {
        req.validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let txn = self.store.begin_write()?;
        let mut user = self
            .store
            .get_user(user_id)?
            .ok_or(UserError::UserNotFound(user_id))?;

        if let Some(name) = req.name {
            user.name = name;
        }
        if let Some(role) = req.role {
            user.role = role;
        }
        if let Some(lifecycle) = req.lifecycle {
            user.lifecycle = lifecycle;
        }
        user.updated_at = now_millis();

        self.store.store_user(&txn, &user)?;
        txn.commit().map_err(StorageError::from)?;

        if !user.lifecycle.is_active() {
            tracing::info!(user_id, "User soft-deleted");
        }
        self.emit(&user);
        Ok(user)
    }

    pub fn get_user(&self, user_id: u64) -> UserResult<UserRecord> {
        self.store
            .get_user(user_id)?
            .ok_or(UserError::UserNotFound(user_id))
    }

    /// Active users only; soft-deleted records stay out of staff lists
    pub fn list_users(&self) -> UserResult<Vec<UserRecord>> {
        let mut users = self.store.list_users()?;
        users.retain(|u| u.lifecycle.is_active());
        Ok(users)
    }
}

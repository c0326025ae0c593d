//! User API module
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/users | GET | Active staff list |
//! | /api/users | POST | Create a user |
//! | /api/users/{id} | GET | Fetch one record (deleted included) |
//! | /api/users/{id} | PUT | Patch name/role/lifecycle; `lifecycle: deleted` soft-deletes |

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use shared::error::AppResult;
use shared::models::UserRecord;

use crate::core::ServerState;
use crate::users::{CreateUserRequest, UpdateUserRequest};

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/users", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_by_id).put(update))
}

async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<UserRecord>>> {
    let users = state.users.list_users()?;
    Ok(Json(users))
}

async fn create(
    State(state): State<ServerState>,
    Json(req): Json<CreateUserRequest>,
) -> AppResult<Json<UserRecord>> {
    let user = state.users.create_user(req)?;
    Ok(Json(user))
}

async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
) -> AppResult<Json<UserRecord>> {
    let user = state.users.get_user(id)?;
    Ok(Json(user))
}

async fn update(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
    Json(req): Json<UpdateUserRequest>,
) -> AppResult<Json<UserRecord>> {
    let user = state.users.update_user(id, req)?;
    Ok(Json(user))
}

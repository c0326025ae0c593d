//! Comanda POS Server - order fulfillment core for a restaurant
//!
//! # Module structure
//!
//! ```text
//! pos-server/src/
//! ├── core/       # Config, state, HTTP server, errors
//! ├── orders/     # Aggregate, state machines, totals, storage, sync, broadcast
//! ├── users/      # Staff records with soft delete
//! ├── gateway/    # WebSocket fan-out with scope filtering
//! ├── api/        # HTTP routes and handlers
//! ├── catalog     # Menu item lookup seam
//! ├── settings    # Tax/service rates with TTL cache
//! ├── printing    # Per-station ticket dispatch
//! └── utils/      # Logger
//! ```

pub mod api;
pub mod catalog;
pub mod core;
pub mod gateway;
pub mod orders;
pub mod printing;
pub mod settings;
pub mod users;
pub mod utils;

pub use crate::core::{Config, Server, ServerState};
pub use gateway::{ClientScope, Gateway};
pub use orders::{OrderService, OrderStorage, SyncService};

// Re-export unified error types from shared
pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Load .env, then set up logging (optionally into LOG_DIR)
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    if let Some(dir) = &log_dir {
        std::fs::create_dir_all(dir)?;
    }
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   ______                                 __
  / ____/___  ____ ___  ____ _____  ____/ /___ _
 / /   / __ \/ __ `__ \/ __ `/ __ \/ __  / __ `/
/ /___/ /_/ / / / / / / /_/ / / / / /_/ / /_/ /
\____/\____/_/ /_/ /_/\__,_/_/ /_/\__,_/\__,_/
    "#
    );
}

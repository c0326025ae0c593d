//! Server state - shared service handles
//!
//! One instance per process, cloned into every handler. All fields are
//! Arc-backed so a clone is a handful of pointer bumps.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::catalog::StaticCatalog;
use crate::core::{Config, Result};
use crate::gateway::Gateway;
use crate::orders::storage::OrderStorage;
use crate::orders::{ChannelBroadcaster, OrderService, SyncService};
use crate::printing::LogPrinter;
use crate::settings::{FixedSettings, SettingsCache};
use crate::users::{UserService, UserStore};

#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub orders: Arc<OrderService>,
    pub sync: Arc<SyncService>,
    pub users: Arc<UserService>,
    pub gateway: Arc<Gateway>,
}

impl ServerState {
    /// Open the databases, load collaborator data, wire the services
    /// together and start the gateway dispatch loop.
    pub async fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;
        let work_dir = Path::new(&config.work_dir);

        let storage = OrderStorage::open(work_dir.join("orders.redb"))?;
        let user_store = UserStore::open(work_dir.join("users.redb"))?;

        // Minted once per process; clients full-sync when it changes
        let epoch = Uuid::new_v4();
        tracing::info!(%epoch, work_dir = %config.work_dir, "Server state initializing");

        let broadcaster = Arc::new(ChannelBroadcaster::new(config.event_channel_capacity));
        let catalog = Arc::new(StaticCatalog::load_or_default(work_dir.join("menu.json")));
        let settings = SettingsCache::new(
            Arc::new(FixedSettings::load_or_default(work_dir.join("settings.json"))),
            Duration::from_millis(config.settings_ttl_ms),
        );

        let orders = Arc::new(OrderService::new(
            storage.clone(),
            catalog,
            settings,
            broadcaster.clone(),
            Arc::new(LogPrinter),
            Duration::from_millis(config.lock_timeout_ms),
        ));
        let sync = Arc::new(SyncService::new(
            storage,
            epoch,
            config.sync_recent_window_ms,
            config.sync_page_limit,
        ));
        let users = Arc::new(UserService::new(user_store, broadcaster.clone()));

        let gateway = Arc::new(Gateway::new(epoch, 64));
        gateway.clone().start_dispatch(broadcaster.subscribe());

        Ok(Self {
            config: config.clone(),
            orders,
            sync,
            users,
            gateway,
        })
    }
}

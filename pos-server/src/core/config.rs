/// Server configuration
///
/// # Environment variables
///
/// Every field can be overridden through the environment:
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | /var/lib/comanda | Working directory (database, menu/settings files, logs) |
/// | HTTP_PORT | 3000 | HTTP service port |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | LOCK_TIMEOUT_MS | 5000 | Per-order lock acquisition timeout |
/// | SETTINGS_TTL_MS | 5000 | Settings snapshot cache TTL |
/// | SYNC_RECENT_WINDOW_MS | 21600000 | Terminal orders younger than this are included in a full sync (6h) |
/// | SYNC_PAGE_LIMIT | 500 | Maximum orders returned by one sync response |
/// | EVENT_CHANNEL_CAPACITY | 1024 | Broadcast channel capacity for the gateway |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/comanda HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for the database and collaborator data files
    pub work_dir: String,
    /// HTTP API service port
    pub http_port: u16,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Per-order lock acquisition timeout (milliseconds)
    pub lock_timeout_ms: u64,
    /// Settings snapshot cache TTL (milliseconds)
    pub settings_ttl_ms: u64,
    /// Recency window for terminal orders in a full sync (milliseconds)
    pub sync_recent_window_ms: i64,
    /// Maximum orders per sync response
    pub sync_page_limit: usize,
    /// Gateway broadcast channel capacity
    pub event_channel_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/comanda".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            lock_timeout_ms: std::env::var("LOCK_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            settings_ttl_ms: std::env::var("SETTINGS_TTL_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            sync_recent_window_ms: std::env::var("SYNC_RECENT_WINDOW_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(6 * 60 * 60 * 1000),
            sync_page_limit: std::env::var("SYNC_PAGE_LIMIT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(500),
            event_channel_capacity: std::env::var("EVENT_CHANNEL_CAPACITY")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(1024),
        }
    }

    /// Override the work dir and port, keeping everything else from the
    /// environment. Used by tests.
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

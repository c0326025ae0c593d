//! Settings collaborator
//!
//! Tax/service rates and the delay threshold are owned by the settings
//! subsystem. The order core reads them through [`SettingsStore`] and
//! caches the snapshot with a short TTL; a rate edit therefore applies
//! to totals computed after the next refresh, which is acceptable
//! staleness for this data.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use shared::models::SettingsSnapshot;

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> SettingsSnapshot;
}

/// Store returning a fixed snapshot (file-fed or default)
pub struct FixedSettings {
    snapshot: SettingsSnapshot,
}

impl FixedSettings {
    pub fn new(snapshot: SettingsSnapshot) -> Self {
        Self { snapshot }
    }

    /// Load `settings.json` from the work dir, falling back to defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match std::fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|raw| serde_json::from_str(&raw).map_err(Into::into))
        {
            Ok(snapshot) => {
                tracing::info!(path = %path.as_ref().display(), "Loaded settings");
                Self::new(snapshot)
            }
            Err(e) => {
                tracing::info!(
                    path = %path.as_ref().display(),
                    "No settings file ({}), using defaults",
                    e
                );
                Self::new(SettingsSnapshot::default())
            }
        }
    }
}

#[async_trait]
impl SettingsStore for FixedSettings {
    async fn load(&self) -> SettingsSnapshot {
        self.snapshot.clone()
    }
}

struct CacheInner {
    store: Arc<dyn SettingsStore>,
    ttl: Duration,
    cached: RwLock<Option<(Instant, SettingsSnapshot)>>,
}

/// TTL cache in front of a settings store
#[derive(Clone)]
pub struct SettingsCache {
    inner: Arc<CacheInner>,
}

impl SettingsCache {
    pub fn new(store: Arc<dyn SettingsStore>, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                store,
                ttl,
                cached: RwLock::new(None),
            }),
        }
    }

    /// Current settings, refreshed from the store when the TTL expired
    pub async fn current(&self) -> SettingsSnapshot {
        if let Some((at, snapshot)) = self.inner.cached.read().as_ref()
            && at.elapsed() < self.inner.ttl
        {
            return snapshot.clone();
        }

        let fresh = self.inner.store.load().await;
        *self.inner.cached.write() = Some((Instant::now(), fresh.clone()));
        fresh
    }

    /// Drop the cached snapshot so the next read hits the store
    pub fn invalidate(&self) {
        *self.inner.cached.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingStore {
        loads: AtomicUsize,
    }

    #[async_trait]
    impl SettingsStore for CountingStore {
        async fn load(&self) -> SettingsSnapshot {
            self.loads.fetch_add(1, Ordering::SeqCst);
            SettingsSnapshot::default()
        }
    }

    #[tokio::test]
    async fn test_cache_hits_within_ttl() {
        let store = Arc::new(CountingStore {
            loads: AtomicUsize::new(0),
        });
        let cache = SettingsCache::new(store.clone(), Duration::from_secs(60));

        cache.current().await;
        cache.current().await;
        cache.current().await;
        assert_eq!(store.loads.load(Ordering::SeqCst), 1);

        cache.invalidate();
        cache.current().await;
        assert_eq!(store.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_ttl_always_reloads() {
        let store = Arc::new(CountingStore {
            loads: AtomicUsize::new(0),
        });
        let cache = SettingsCache::new(store.clone(), Duration::from_millis(0));

        cache.current().await;
        cache.current().await;
        assert_eq!(store.loads.load(Ordering::SeqCst), 2);
    }
}

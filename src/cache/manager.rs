//! TTL result cache with a background sweeper.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::backend::{CacheBackend, MemoryCache};
use super::key::CacheKey;
use crate::config::Settings;
use crate::Result;

/// Bounds applied to the sweep period when the sweeper starts.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);
pub const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub default_ttl: Duration,
    pub sweep_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(60 * 60),
            sweep_interval: Duration::from_secs(10 * 60),
        }
    }
}

impl CacheConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            default_ttl: settings.cache_ttl(),
            sweep_interval: settings.cache_sweep_interval(),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Stored entries, including expired ones not yet swept.
    pub count: usize,
    /// Rendered keys, sorted.
    pub keys: Vec<String>,
    pub hits: u64,
    pub misses: u64,
}

struct Sweeper {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Maps `(resource_id, operation)` to a previously computed artifact.
///
/// Expired entries are dropped lazily when read and periodically by a
/// background sweep started with [`ResultCache::start_sweeper`] and stopped
/// by [`ResultCache::shutdown`] (or drop). Writes are last-write-wins.
pub struct ResultCache {
    config: CacheConfig,
    backend: Arc<dyn CacheBackend>,
    hits: AtomicU64,
    misses: AtomicU64,
    sweeper: Mutex<Option<Sweeper>>,
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("config", &self.config)
            .field("backend", &self.backend.name())
            .field("sweeping", &self.is_sweeping())
            .finish()
    }
}

impl ResultCache {
    pub fn new(config: CacheConfig, backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            config,
            backend,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            sweeper: Mutex::new(None),
        }
    }

    pub fn in_memory(config: CacheConfig) -> Self {
        Self::new(config, Arc::new(MemoryCache::new()))
    }

    /// In-memory cache with its sweeper already running. Must be called
    /// from within a Tokio runtime.
    pub fn start(config: CacheConfig) -> Self {
        let cache = Self::in_memory(config);
        cache.start_sweeper();
        cache
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub async fn get(&self, resource_id: &str, operation: &str) -> Result<Option<Value>> {
        let key = CacheKey::new(resource_id, operation);
        let found = self.backend.get(&key).await?;
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "cache hit");
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        Ok(found)
    }

    /// Typed read. An entry that no longer deserializes is treated as a miss.
    pub async fn get_as<T: DeserializeOwned>(
        &self,
        resource_id: &str,
        operation: &str,
    ) -> Result<Option<T>> {
        match self.get(resource_id, operation).await? {
            Some(value) => match serde_json::from_value(value) {
                Ok(v) => Ok(Some(v)),
                Err(e) => {
                    warn!(resource_id, operation, error = %e, "discarding undecodable cache entry");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    pub async fn set(&self, resource_id: &str, operation: &str, artifact: Value) -> Result<()> {
        self.set_with_ttl(resource_id, operation, artifact, self.config.default_ttl)
            .await
    }

    pub async fn set_with_ttl(
        &self,
        resource_id: &str,
        operation: &str,
        artifact: Value,
        ttl: Duration,
    ) -> Result<()> {
        let key = CacheKey::new(resource_id, operation);
        self.backend.set(&key, artifact, ttl).await?;
        debug!(key = %key, ttl_secs = ttl.as_secs(), "cache set");
        Ok(())
    }

    pub async fn set_as<T: Serialize>(
        &self,
        resource_id: &str,
        operation: &str,
        artifact: &T,
    ) -> Result<()> {
        let value = serde_json::to_value(artifact)?;
        self.set(resource_id, operation, value).await
    }

    pub async fn invalidate(&self, resource_id: &str, operation: &str) -> Result<bool> {
        self.backend
            .remove(&CacheKey::new(resource_id, operation))
            .await
    }

    pub async fn invalidate_all(&self) -> Result<()> {
        self.backend.clear().await
    }

    /// Remove expired entries now. The sweeper calls this on every tick.
    pub async fn sweep(&self) -> Result<usize> {
        self.backend.purge_expired().await
    }

    pub async fn stats(&self) -> Result<CacheStats> {
        let mut keys: Vec<String> = self
            .backend
            .keys()
            .await?
            .iter()
            .map(ToString::to_string)
            .collect();
        keys.sort();
        Ok(CacheStats {
            count: keys.len(),
            keys,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        })
    }

    /// Spawn the periodic sweep. No-op if already running.
    pub fn start_sweeper(&self) {
        let mut slot = self.sweeper.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().map_or(false, |s| !s.handle.is_finished()) {
            return;
        }

        let cancel = CancellationToken::new();
        let backend = Arc::clone(&self.backend);
        let period = self
            .config
            .sweep_interval
            .clamp(MIN_SWEEP_INTERVAL, MAX_SWEEP_INTERVAL);
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let now = tokio::time::Instant::now();
            let start = now.checked_add(period).unwrap_or(now);
            let mut ticker = tokio::time::interval_at(start, period);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => match backend.purge_expired().await {
                        Ok(0) => {}
                        Ok(n) => debug!(removed = n, "cache sweep"),
                        Err(e) => warn!(error = %e, "cache sweep failed"),
                    },
                }
            }
            debug!("cache sweeper stopped");
        });
        *slot = Some(Sweeper { cancel, handle });
    }

    pub fn is_sweeping(&self) -> bool {
        self.sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(false, |s| !s.cancel.is_cancelled() && !s.handle.is_finished())
    }

    /// Stop the background sweep. Stored entries stay readable.
    pub fn shutdown(&self) {
        if let Some(sweeper) = self
            .sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            sweeper.cancel.cancel();
        }
    }
}

impl Drop for ResultCache {
    fn drop(&mut self) {
        self.shutdown();
    }
}

//! Result caching keyed by resource and operation.
//!
//! Generated artifacts are cached under `analyze:{operation}:{resource_id}`
//! so repeated requests for the same article skip the backends entirely.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ResultCache`] | TTL cache with hit/miss counters and a periodic sweeper |
//! | [`CacheConfig`] | Default TTL and sweep interval |
//! | [`CacheBackend`] | Trait for pluggable stores |
//! | [`MemoryCache`] | Process-local store |
//! | [`NullCache`] | Store that keeps nothing, for disabling the cache |
//! | [`CacheKey`] | `(resource_id, operation)` pair |
//!
//! ```rust
//! use article_digest::cache::{CacheConfig, ResultCache};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> article_digest::Result<()> {
//! let cache = ResultCache::in_memory(CacheConfig::default());
//! cache.set("https://example.com/a", "about", json!("summary")).await?;
//! assert!(cache.get("https://example.com/a", "thesis").await?.is_none());
//! # Ok(())
//! # }
//! ```

mod backend;
mod key;
mod manager;

pub use backend::{CacheBackend, CacheEntry, MemoryCache, NullCache};
pub use key::CacheKey;
pub use manager::{CacheConfig, CacheStats, ResultCache, MAX_SWEEP_INTERVAL, MIN_SWEEP_INTERVAL};

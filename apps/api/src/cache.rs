#![allow(dead_code)]

//! TTL-based response cache for external API calls.
//!
//! The backing store is pluggable: an in-process map by default, Redis when
//! configured. Either way the contract is identical: a read past an
//! entry's TTL is a miss, and entries may be lazily evicted on read. When
//! caching is disabled the wrapper passes calls straight through without
//! touching any backend.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

/// Derives a deterministic cache key from an operation name and its
/// arguments. `args` should be a JSON object; `serde_json` maps are
/// sorted-key, so identical logical calls collide regardless of the order
/// arguments were supplied in.
pub fn cache_key(operation: &str, args: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(operation.as_bytes());
    hasher.update(b":");
    hasher.update(args.to_string().as_bytes());
    format!("{}:{}", operation, hex::encode(hasher.finalize()))
}

#[async_trait]
trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Option<Value>;
    async fn set(&self, key: &str, value: Value, ttl: Duration);
    async fn delete(&self, key: &str);
    async fn clear(&self);
}

/// In-process cache backend with per-entry expiry and lazy eviction.
#[derive(Default)]
struct MemoryBackend {
    entries: Mutex<HashMap<String, (Value, DateTime<Utc>)>>,
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        match entries.get(key) {
            Some((value, expiry)) if Utc::now() < *expiry => {
                debug!("Cache hit: {key}");
                Some(value.clone())
            }
            Some(_) => {
                entries.remove(key);
                debug!("Cache expired: {key}");
                None
            }
            None => {
                debug!("Cache miss: {key}");
                None
            }
        }
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) {
        let expiry = Utc::now()
            + chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::seconds(0));
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .insert(key.to_string(), (value, expiry));
    }

    async fn delete(&self, key: &str) {
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .remove(key);
    }

    async fn clear(&self) {
        self.entries.lock().expect("cache lock poisoned").clear();
    }
}

/// Redis cache backend. Expiry is delegated to Redis via SETEX.
struct RedisBackend {
    conn: redis::aio::MultiplexedConnection,
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn get(&self, key: &str) -> Option<Value> {
        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    debug!("Redis cache hit: {key}");
                    Some(value)
                }
                Err(e) => {
                    warn!("Redis cache deserialization error: {e}");
                    None
                }
            },
            Ok(None) => {
                debug!("Redis cache miss: {key}");
                None
            }
            Err(e) => {
                error!("Redis GET error: {e}");
                None
            }
        }
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) {
        let mut conn = self.conn.clone();
        if let Err(e) = conn
            .set_ex::<_, _, ()>(key, value.to_string(), ttl.as_secs())
            .await
        {
            error!("Redis SET error: {e}");
        }
    }

    async fn delete(&self, key: &str) {
        let mut conn = self.conn.clone();
        if let Err(e) = conn.del::<_, ()>(key).await {
            error!("Redis DEL error: {e}");
        }
    }

    async fn clear(&self) {
        let mut conn = self.conn.clone();
        if let Err(e) = redis::cmd("FLUSHDB").query_async::<_, ()>(&mut conn).await {
            error!("Redis FLUSHDB error: {e}");
        }
    }
}

/// Unified response cache over a pluggable backend.
pub struct ResponseCache {
    backend: Option<Box<dyn CacheBackend>>,
    backend_name: &'static str,
    default_ttl: Duration,
}

impl ResponseCache {
    /// Builds the cache from configuration: disabled when the caching flag
    /// is off, Redis when a URL is configured and reachable, in-memory
    /// otherwise (including Redis connection failure, which degrades with
    /// a warning).
    pub async fn connect(config: &crate::config::Config) -> Self {
        if !config.enable_caching {
            info!("Caching disabled");
            return Self::disabled();
        }
        let default_ttl = Duration::from_secs(config.cache_ttl_secs);

        if let Some(url) = &config.redis_url {
            match Self::connect_redis(url, default_ttl).await {
                Ok(cache) => {
                    info!("Cache initialized with redis backend (TTL: {}s)", config.cache_ttl_secs);
                    return cache;
                }
                Err(e) => {
                    warn!("Failed to initialize Redis cache: {e}. Falling back to in-memory cache.");
                }
            }
        }

        info!("Cache initialized with memory backend (TTL: {}s)", config.cache_ttl_secs);
        Self::in_memory(default_ttl)
    }

    async fn connect_redis(url: &str, default_ttl: Duration) -> anyhow::Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_tokio_connection().await?;
        Ok(Self {
            backend: Some(Box::new(RedisBackend { conn })),
            backend_name: "redis",
            default_ttl,
        })
    }

    pub fn in_memory(default_ttl: Duration) -> Self {
        Self {
            backend: Some(Box::new(MemoryBackend::default())),
            backend_name: "memory",
            default_ttl,
        }
    }

    pub fn disabled() -> Self {
        Self {
            backend: None,
            backend_name: "disabled",
            default_ttl: Duration::ZERO,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend_name
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        self.backend.as_ref()?.get(key).await
    }

    pub async fn set(&self, key: &str, value: Value) {
        self.set_with_ttl(key, value, self.default_ttl).await;
    }

    pub async fn set_with_ttl(&self, key: &str, value: Value, ttl: Duration) {
        if let Some(backend) = &self.backend {
            backend.set(key, value, ttl).await;
        }
    }

    pub async fn delete(&self, key: &str) {
        if let Some(backend) = &self.backend {
            backend.delete(key).await;
        }
    }

    pub async fn clear(&self) {
        if let Some(backend) = &self.backend {
            backend.clear().await;
        }
    }

    /// Typed read; a value that fails to deserialize counts as a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key).await?;
        serde_json::from_value(value).ok()
    }

    /// Typed write with the default TTL. Serialization failure is logged
    /// and skipped; caching is best-effort.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(value) => self.set(key, value).await,
            Err(e) => error!("Cache serialization error: {e}"),
        }
    }
}

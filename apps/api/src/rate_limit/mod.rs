//! Fixed-window attempt limiter for the analysis entry points.
//!
//! Counting lives behind [`RateLimitStore`] so a single instance can keep the
//! window in memory while a multi-instance deployment shares it through Redis.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

pub mod memory;
pub mod redis;

pub use memory::MemoryRateLimitStore;
pub use self::redis::RedisRateLimitStore;

#[derive(Debug, Error)]
pub enum RateLimitStoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),
}

#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Records one attempt for `key` and returns the number of attempts inside
    /// the current window, this one included.
    async fn hit(&self, key: &str, window: Duration) -> Result<u32, RateLimitStoreError>;
}

pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    max_attempts: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, max_attempts: u32, window: Duration) -> Self {
        Self {
            store,
            max_attempts,
            window,
        }
    }

    /// Consumes one attempt. A store failure lets the request through.
    pub async fn is_allowed(&self, key: &str) -> bool {
        match self.store.hit(key, self.window).await {
            Ok(count) => count <= self.max_attempts,
            Err(err) => {
                warn!(key, error = %err, "Rate limit store unavailable, allowing request");
                true
            }
        }
    }
}

/// Identity a caller is limited under.
pub fn rate_limit_key(user_id: Option<Uuid>, forwarded_for: Option<&str>) -> String {
    if let Some(id) = user_id {
        return format!("user:{id}");
    }
    match forwarded_for
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        Some(ip) => format!("ip:{ip}"),
        None => "anonymous".to_string(),
    }
}

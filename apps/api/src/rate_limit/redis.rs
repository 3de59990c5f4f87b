use std::time::Duration;

use async_trait::async_trait;

use super::{RateLimitStore, RateLimitStoreError};

const KEY_PREFIX: &str = "personaflow:ratelimit:";

/// Shared counters for multi-instance deployments. The window is fixed rather
/// than sliding: the key is created with its expiry and later hits only count.
pub struct RedisRateLimitStore {
    client: redis::Client,
}

impl RedisRateLimitStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

/// `SET key 0 NX EX window` then `INCR key` inside one MULTI/EXEC, so a
/// counter can never exist without a TTL.
fn hit_pipeline(redis_key: &str, window: Duration) -> redis::Pipeline {
    let secs = window.as_secs().max(1);
    let mut pipe = redis::pipe();
    pipe.atomic()
        .cmd("SET")
        .arg(redis_key)
        .arg(0)
        .arg("NX")
        .arg("EX")
        .arg(secs)
        .ignore()
        .incr(redis_key, 1u32);
    pipe
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    async fn hit(&self, key: &str, window: Duration) -> Result<u32, RateLimitStoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let redis_key = format!("{KEY_PREFIX}{key}");

        let (count,): (u32,) = hit_pipeline(&redis_key, window)
            .query_async(&mut conn)
            .await?;
        Ok(count)
    }
}

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::{RateLimitStore, RateLimitStoreError};

/// Prune expired windows once the map grows past this many keys.
const PRUNE_THRESHOLD: usize = 10_000;

struct Window {
    started: Instant,
    count: u32,
}

/// Process-local counters. Not shared across instances and lost on restart.
#[derive(Default)]
pub struct MemoryRateLimitStore {
    windows: Mutex<HashMap<String, Window>>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitStore for MemoryRateLimitStore {
    async fn hit(&self, key: &str, window: Duration) -> Result<u32, RateLimitStoreError> {
        let now = Instant::now();
        // A poisoned lock only means another request panicked mid-update;
        // the counters are still usable.
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if windows.len() > PRUNE_THRESHOLD {
            windows.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= window {
            entry.started = now;
            entry.count = 0;
        }
        entry.count = entry.count.saturating_add(1);
        Ok(entry.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_counts_reset_after_window() {
        let store = MemoryRateLimitStore::new();
        let window = Duration::from_secs(60);

        assert_eq!(store.hit("k", window).await.unwrap(), 1);
        assert_eq!(store.hit("k", window).await.unwrap(), 2);

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(store.hit("k", window).await.unwrap(), 3);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(store.hit("k", window).await.unwrap(), 1);
    }
}

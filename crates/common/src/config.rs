//! Cache configuration types.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Freshness and batching parameters for a price cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Max age of a cached price before it is refetched (seconds).
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,

    /// Optional deadline for a whole batch lookup (milliseconds).
    /// Batches wait indefinitely when unset.
    #[serde(default)]
    pub batch_timeout_ms: Option<u64>,
}

fn default_max_age() -> u64 {
    60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age_secs: default_max_age(),
            batch_timeout_ms: None,
        }
    }
}

impl CacheConfig {
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }

    pub fn batch_timeout(&self) -> Option<Duration> {
        self.batch_timeout_ms.map(Duration::from_millis)
    }

    /// Reject values that would make the cache useless or batches fail instantly.
    pub fn validate(&self) -> crate::Result<()> {
        if self.max_age_secs == 0 {
            return Err(crate::Error::Config(
                "cache.max_age_secs must be greater than 0".into(),
            ));
        }
        if self.batch_timeout_ms == Some(0) {
            return Err(crate::Error::Config(
                "cache.batch_timeout_ms must be greater than 0 when set".into(),
            ));
        }
        Ok(())
    }
}

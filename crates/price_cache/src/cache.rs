//! Single-key cache store.
//!
//! Uses `DashMap` so the hot path (fresh hits) never waits on the write
//! section. Refreshes serialize on `write_lock`, held only around the
//! insert. Two callers can both see a stale entry and both go upstream;
//! the last write wins and the stored entry stays consistent.

use common::{CacheConfig, Error, Result};
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::service::PriceService;

/// A cached price with the instant it was stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceEntry {
    pub price: f64,
    pub stored_at: Instant,
}

impl PriceEntry {
    /// Fresh while `stored_at + max_age` is strictly in the future.
    pub fn is_fresh(&self, max_age: Duration) -> bool {
        match self.stored_at.checked_add(max_age) {
            Some(expires_at) => expires_at > Instant::now(),
            None => true,
        }
    }
}

/// Price cache in front of an upstream [`PriceService`].
///
/// Cloning is cheap and every clone shares the same entries.
#[derive(Clone)]
pub struct TransparentCache {
    service: Arc<dyn PriceService>,
    max_age: Duration,
    prices: Arc<DashMap<String, PriceEntry>>,
    write_lock: Arc<Mutex<()>>,
}

impl TransparentCache {
    pub fn new(service: Arc<dyn PriceService>, max_age: Duration) -> Self {
        Self {
            service,
            max_age,
            prices: Arc::new(DashMap::new()),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn from_config(service: Arc<dyn PriceService>, config: &CacheConfig) -> Self {
        Self::new(service, config.max_age())
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Get the price for an item, from the cache if fresh, otherwise upstream.
    pub async fn get_price_for(&self, item_code: &str) -> Result<f64> {
        let cached = self.prices.get(item_code).map(|entry| *entry);
        if let Some(entry) = cached {
            if entry.is_fresh(self.max_age) {
                debug!("{}: cache hit ({})", item_code, entry.price);
                return Ok(entry.price);
            }
            debug!("{}: cached price expired, refreshing", item_code);
        }

        let price = self
            .service
            .get_price_for(item_code)
            .await
            .map_err(|e| {
                warn!("{}: upstream lookup failed: {}", item_code, e);
                Error::Upstream {
                    key: item_code.to_string(),
                    source: Box::new(e),
                }
            })?;

        let _guard = self.write_lock.lock().await;
        self.prices.insert(
            item_code.to_string(),
            PriceEntry {
                price,
                stored_at: Instant::now(),
            },
        );
        debug!("{}: stored fresh price {}", item_code, price);

        Ok(price)
    }

    /// Current entry for an item, fresh or not. Never calls upstream.
    pub fn entry(&self, item_code: &str) -> Option<PriceEntry> {
        self.prices.get(item_code).map(|entry| *entry)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl fmt::Debug for TransparentCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransparentCache")
            .field("max_age", &self.max_age)
            .field("entries", &self.prices.len())
            .finish()
    }
}

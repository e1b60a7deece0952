//! Simulated upstream: serves prices from the configured table after a delay.

use async_trait::async_trait;
use common::{Error, Result};
use price_cache::PriceService;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::config::UpstreamConfig;

pub struct TablePriceService {
    prices: HashMap<String, f64>,
    fail_items: HashSet<String>,
    latency: Duration,
    calls: AtomicU64,
}

impl TablePriceService {
    pub fn new(config: &UpstreamConfig) -> Self {
        Self {
            prices: config.prices.clone(),
            fail_items: config.fail_items.iter().cloned().collect(),
            latency: Duration::from_millis(config.latency_ms),
            calls: AtomicU64::new(0),
        }
    }

    /// Upstream calls served so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PriceService for TablePriceService {
    async fn get_price_for(&self, item_code: &str) -> Result<f64> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        debug!("{}: upstream lookup ({:?})", item_code, self.latency);
        tokio::time::sleep(self.latency).await;

        if self.fail_items.contains(item_code) {
            return Err(Error::Other(format!("upstream unavailable for {}", item_code)));
        }
        self.prices
            .get(item_code)
            .copied()
            .ok_or_else(|| Error::PriceNotFound(item_code.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> UpstreamConfig {
        UpstreamConfig {
            latency_ms: 250,
            prices: HashMap::from([("ABC".to_string(), 10.0)]),
            fail_items: vec!["DOWN".to_string()],
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_serves_table_price_after_latency() {
        let service = TablePriceService::new(&config());
        let start = tokio::time::Instant::now();
        assert_eq!(service.get_price_for("ABC").await.unwrap(), 10.0);
        assert!(start.elapsed() >= Duration::from_millis(250));
        assert_eq!(service.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_and_failing_items() {
        let service = TablePriceService::new(&config());
        assert!(matches!(
            service.get_price_for("NOPE").await,
            Err(Error::PriceNotFound(_))
        ));
        assert!(matches!(
            service.get_price_for("DOWN").await,
            Err(Error::Other(_))
        ));
        assert_eq!(service.calls(), 2);
    }
}

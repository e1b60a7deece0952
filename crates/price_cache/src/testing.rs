//! Upstream doubles shared by the cache and batch tests.

use async_trait::async_trait;
use common::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::PriceService;

/// Returns the scripted prices in call order, repeating the last one.
pub(crate) struct SequenceService {
    prices: Vec<f64>,
    calls: AtomicUsize,
    latency: Option<Duration>,
}

impl SequenceService {
    pub(crate) fn new(prices: Vec<f64>) -> Self {
        Self {
            prices,
            calls: AtomicUsize::new(0),
            latency: None,
        }
    }

    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceService for SequenceService {
    async fn get_price_for(&self, _item_code: &str) -> Result<f64> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let idx = n.min(self.prices.len().saturating_sub(1));
        self.prices
            .get(idx)
            .copied()
            .ok_or_else(|| Error::Other("no scripted prices".into()))
    }
}

/// Serves fixed prices per item. Unknown items fail, hanging items never return.
#[derive(Default)]
pub(crate) struct TableService {
    prices: HashMap<String, f64>,
    hanging: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl TableService {
    pub(crate) fn new(prices: &[(&str, f64)]) -> Self {
        Self {
            prices: prices.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            ..Default::default()
        }
    }

    pub(crate) fn hang_on(mut self, item_code: &str) -> Self {
        self.hanging.insert(item_code.to_string());
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn record(&self, item_code: &str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(item_code.to_string());
        }
    }
}

#[async_trait]
impl PriceService for TableService {
    async fn get_price_for(&self, item_code: &str) -> Result<f64> {
        self.record(item_code);
        if self.hanging.contains(item_code) {
            std::future::pending::<()>().await;
        }
        self.prices
            .get(item_code)
            .copied()
            .ok_or_else(|| Error::PriceNotFound(item_code.to_string()))
    }
}

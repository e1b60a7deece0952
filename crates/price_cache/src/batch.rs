//! Batch lookups — fan out one task per item code, fan in every result.
//!
//! Results come back in input order. If any lookup fails the whole batch
//! fails with every failing key listed, and no partial prices are returned.
//! Successful lookups in a failed batch are still cached.

use common::{Error, Result};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::cache::TransparentCache;

type Slot = Option<Result<f64>>;

impl TransparentCache {
    /// Get prices for several items at once. Waits for every lookup.
    pub async fn get_prices_for<S: AsRef<str>>(&self, item_codes: &[S]) -> Result<Vec<f64>> {
        self.fan_out(item_codes, None).await
    }

    /// Like [`get_prices_for`](Self::get_prices_for), but gives up once
    /// `deadline` passes and aborts the lookups still in flight.
    pub async fn get_prices_for_within<S: AsRef<str>>(
        &self,
        item_codes: &[S],
        deadline: Duration,
    ) -> Result<Vec<f64>> {
        self.fan_out(item_codes, Some(deadline)).await
    }

    async fn fan_out<S: AsRef<str>>(
        &self,
        item_codes: &[S],
        deadline: Option<Duration>,
    ) -> Result<Vec<f64>> {
        let keys: Vec<String> = item_codes.iter().map(|k| k.as_ref().to_string()).collect();
        let requested = keys.len();
        if requested == 0 {
            return Ok(Vec::new());
        }

        let (tx, mut rx) = mpsc::channel::<(usize, Result<f64>)>(requested);
        let mut tasks = JoinSet::new();
        for (idx, key) in keys.iter().cloned().enumerate() {
            let cache = self.clone();
            let tx = tx.clone();
            tasks.spawn(async move {
                let result = cache.get_price_for(&key).await;
                // Receiver is only gone once the batch has been abandoned.
                let _ = tx.send((idx, result)).await;
            });
        }
        drop(tx);
        debug!("Dispatched {} price lookups", requested);

        let mut slots: Vec<Slot> = (0..requested).map(|_| None).collect();
        let mut completed = 0usize;
        let collect = async {
            // Ends once every task has reported or dropped its sender.
            while let Some((idx, result)) = rx.recv().await {
                slots[idx] = Some(result);
                completed += 1;
            }
        };

        match deadline {
            None => collect.await,
            Some(deadline) => {
                if tokio::time::timeout(deadline, collect).await.is_err() {
                    tasks.abort_all();
                    warn!(
                        "Batch of {} timed out after {:?} ({} completed)",
                        requested, deadline, completed
                    );
                    return Err(Error::BatchTimeout {
                        requested,
                        completed,
                        deadline_ms: deadline.as_millis() as u64,
                    });
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                warn!("Price lookup task failed: {}", e);
            }
        }

        finalize(&keys, slots)
    }
}

/// Turn the collected slots into prices, or one error listing every failure.
fn finalize(keys: &[String], slots: Vec<Slot>) -> Result<Vec<f64>> {
    let mut prices = Vec::with_capacity(keys.len());
    let mut failures = Vec::new();

    for (key, slot) in keys.iter().zip(slots) {
        match slot {
            Some(Ok(price)) => prices.push(price),
            Some(Err(e)) => failures.push(e),
            None => failures.push(Error::TaskAborted {
                key: key.clone(),
                reason: "lookup task ended without reporting a result".into(),
            }),
        }
    }

    if failures.is_empty() {
        return Ok(prices);
    }

    warn!(
        "{} of {} price lookups failed, discarding {} prices",
        failures.len(),
        keys.len(),
        prices.len()
    );
    Err(Error::Batch {
        requested: keys.len(),
        failures,
    })
}

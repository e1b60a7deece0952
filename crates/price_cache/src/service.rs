//! Upstream price lookup port.

use async_trait::async_trait;
use common::Result;

/// The expensive source of truth for prices.
///
/// Calls may take a long time. Implementations must tolerate concurrent
/// calls, including concurrent calls for the same item code.
#[async_trait]
pub trait PriceService: Send + Sync {
    /// Fetch the current price for one item.
    async fn get_price_for(&self, item_code: &str) -> Result<f64>;
}

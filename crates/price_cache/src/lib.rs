//! Transparent, time-bounded price cache.
//!
//! Wraps a slow upstream [`PriceService`] and remembers prices for a
//! configured max age. Batch lookups fan out one task per item code.

pub mod batch;
pub mod cache;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{PriceEntry, TransparentCache};
pub use service::PriceService;

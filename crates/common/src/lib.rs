//! Shared config and error definitions for the price cache.

pub mod config;
pub mod error;

pub use config::CacheConfig;
pub use error::Error;

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;

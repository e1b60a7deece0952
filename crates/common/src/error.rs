//! Unified error type for the price cache.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("getting price from service for {key}: {source}")]
    Upstream {
        key: String,
        #[source]
        source: Box<Error>,
    },

    #[error("{} of {requested} price lookups failed: {}", .failures.len(), first_failure(.failures))]
    Batch {
        requested: usize,
        failures: Vec<Error>,
    },

    #[error("Batch timed out after {deadline_ms}ms ({completed}/{requested} lookups completed)")]
    BatchTimeout {
        requested: usize,
        completed: usize,
        deadline_ms: u64,
    },

    #[error("Price lookup task for {key} aborted: {reason}")]
    TaskAborted { key: String, reason: String },

    #[error("No price for item: {0}")]
    PriceNotFound(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Item code this error is about, if it concerns a single key.
    pub fn key(&self) -> Option<&str> {
        match self {
            Error::Upstream { key, .. } | Error::TaskAborted { key, .. } => Some(key),
            Error::PriceNotFound(item) => Some(item),
            _ => None,
        }
    }
}

fn first_failure(failures: &[Error]) -> String {
    failures
        .first()
        .map(|e| e.to_string())
        .unwrap_or_else(|| "no failure recorded".into())
}

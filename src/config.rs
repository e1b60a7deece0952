//! Configuration loader — merges env vars, .env file, and config.toml.

use common::{CacheConfig, Error};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Top-level CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Freshness and batch parameters.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Simulated upstream price table.
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

/// Simulated upstream settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Delay applied to every upstream call (milliseconds).
    #[serde(default = "default_latency")]
    pub latency_ms: u64,

    /// Item code → price.
    #[serde(default)]
    pub prices: HashMap<String, f64>,

    /// Items whose lookups always fail.
    #[serde(default)]
    pub fail_items: Vec<String>,
}

fn default_latency() -> u64 {
    200
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_latency(),
            prices: HashMap::new(),
            fail_items: Vec::new(),
        }
    }
}

// ── Config loader ─────────────────────────────────────────────────────

/// Load configuration from the optional TOML file and the environment.
pub fn load_config(path: &Path) -> Result<AppConfig, Error> {
    // 1. Load .env file from project root or parent directories.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults, then the config file if it exists.
    let mut config = if path.exists() {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        parse_config(&contents)?
    } else {
        tracing::debug!("{} not found, using defaults", path.display());
        AppConfig::default()
    };

    // 3. Override with environment variables (highest priority).
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;

    // 4. Validate.
    config.cache.validate()?;

    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<AppConfig, Error> {
    toml::from_str(contents).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
}

fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), Error>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup("PRICE_CACHE_MAX_AGE_SECS") {
        config.cache.max_age_secs = parse_u64("PRICE_CACHE_MAX_AGE_SECS", &raw)?;
    }
    if let Some(raw) = lookup("PRICE_CACHE_BATCH_TIMEOUT_MS") {
        let trimmed = raw.trim();
        config.cache.batch_timeout_ms = if trimmed.is_empty() {
            None
        } else {
            Some(parse_u64("PRICE_CACHE_BATCH_TIMEOUT_MS", trimmed)?)
        };
    }
    if let Some(raw) = lookup("PRICE_CACHE_UPSTREAM_LATENCY_MS") {
        config.upstream.latency_ms = parse_u64("PRICE_CACHE_UPSTREAM_LATENCY_MS", &raw)?;
    }
    Ok(())
}

fn parse_u64(name: &str, raw: &str) -> Result<u64, Error> {
    raw.trim()
        .parse()
        .map_err(|e| Error::Config(format!("{} must be a non-negative integer: {}", name, e)))
}

//! Price cache CLI.
//!
//! Wires the transparent cache to the simulated table upstream and
//! resolves a batch of item codes one or more times, so repeat rounds
//! show cache hits.

mod config;
mod table_service;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use clap::Parser;
use price_cache::TransparentCache;
use serde_json::json;
use tracing::{error, info};

use crate::config::load_config;
use crate::table_service::TablePriceService;

#[derive(Parser)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Print results as JSON.
    #[arg(long)]
    json: bool,

    /// How many times to resolve the batch.
    #[arg(long, default_value_t = 2)]
    rounds: u32,

    /// Item codes to price.
    #[arg(required = true)]
    items: Vec<String>,
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

async fn resolve(
    cache: &TransparentCache,
    items: &[String],
    cfg: &common::CacheConfig,
) -> common::Result<Vec<f64>> {
    match cfg.batch_timeout() {
        Some(deadline) => cache.get_prices_for_within(items, deadline).await,
        None => cache.get_prices_for(items).await,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "price_cache_cli=info,price_cache=info".into()),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let cfg = load_config(&cli.config)?;
    info!(
        "Cache config: max_age={}s batch_timeout={:?}",
        cfg.cache.max_age_secs, cfg.cache.batch_timeout_ms
    );

    let upstream = Arc::new(TablePriceService::new(&cfg.upstream));
    let cache = TransparentCache::from_config(upstream.clone(), &cfg.cache);

    let mut rounds = Vec::new();
    for round in 1..=cli.rounds {
        let started = Instant::now();
        let prices = match resolve(&cache, &cli.items, &cfg.cache).await {
            Ok(prices) => prices,
            Err(e) => {
                error!("Round {} failed: {}", round, e);
                return Err(e.into());
            }
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            "Round {}: {} prices in {}ms (upstream calls so far: {})",
            round,
            prices.len(),
            elapsed_ms,
            upstream.calls()
        );

        if !cli.json {
            for (item, price) in cli.items.iter().zip(&prices) {
                println!("{} {}", item, price);
            }
        }
        rounds.push(json!({
            "round": round,
            "elapsed_ms": elapsed_ms,
            "prices": cli
                .items
                .iter()
                .zip(&prices)
                .map(|(item, price)| json!({ "item": item, "price": price }))
                .collect::<Vec<_>>(),
        }));
    }

    if cli.json {
        let report = json!({
            "as_of": now_iso(),
            "max_age_secs": cfg.cache.max_age_secs,
            "upstream_calls": upstream.calls(),
            "cached_items": cache.len(),
            "rounds": rounds,
        });
        println!("{}", serde_json::to_string_pretty(&report).map_err(common::Error::from)?);
    }

    Ok(())
}

//! tierkv workload driver
//!
//! Exercises the tiered access layer against in-memory backends: writes a
//! keyspace through the shard router, replays reads to warm the cache
//! tiers, and reports the statistics snapshot and per-shard occupancy.
//! Useful for eyeballing hit rates and shard balance for a given
//! configuration before wiring the layer behind a real serving surface.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tierkv::{AccessConfig, AccessLayer, InMemoryCacheTier, InMemoryShardedStore, Result};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Tiered cache-aside access layer workload driver
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of backing-store shards
    #[arg(long, env = "NUM_SHARDS", default_value = "3")]
    num_shards: u32,

    /// L1 cache capacity in entries
    #[arg(long, env = "L1_MAX_ENTRIES", default_value = "100")]
    l1_max_entries: usize,

    /// L1 cache TTL in seconds
    #[arg(long, env = "L1_TTL_SECONDS", default_value = "60")]
    l1_ttl_seconds: u64,

    /// L2 cache TTL in seconds
    #[arg(long, env = "L2_TTL_SECONDS", default_value = "300")]
    l2_ttl_seconds: u64,

    /// L2 round-trip timeout in milliseconds
    #[arg(long, env = "L2_TIMEOUT_MS", default_value = "250")]
    l2_timeout_ms: u64,

    /// Store round-trip timeout in milliseconds
    #[arg(long, env = "STORE_TIMEOUT_MS", default_value = "2000")]
    store_timeout_ms: u64,

    /// Connections per shard in the store pool
    #[arg(long, env = "STORE_POOL_SIZE", default_value = "10")]
    store_pool_size: usize,

    /// Number of keys to write
    #[arg(long, env = "WORKLOAD_KEYS", default_value = "300")]
    keys: u32,

    /// Read passes over the keyspace
    #[arg(long, env = "WORKLOAD_ROUNDS", default_value = "3")]
    rounds: u32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    info!("Starting tierkv workload driver");
    info!("  Shards: {}", args.num_shards);
    info!(
        "  L1: {} entries, {}s TTL",
        args.l1_max_entries, args.l1_ttl_seconds
    );
    info!("  L2 TTL: {}s", args.l2_ttl_seconds);
    info!("  Workload: {} keys, {} read rounds", args.keys, args.rounds);

    let config = AccessConfig {
        num_shards: args.num_shards,
        l1_max_entries: args.l1_max_entries,
        l1_ttl: Duration::from_secs(args.l1_ttl_seconds),
        l2_ttl: Duration::from_secs(args.l2_ttl_seconds),
        l2_timeout: Duration::from_millis(args.l2_timeout_ms),
        store_timeout: Duration::from_millis(args.store_timeout_ms),
        store_pool_size: args.store_pool_size,
    };

    let l2 = Arc::new(InMemoryCacheTier::new());
    let store = Arc::new(InMemoryShardedStore::new(
        args.num_shards,
        args.store_pool_size,
    ));
    let layer = Arc::new(AccessLayer::new(config, l2, store)?);

    // Write phase
    for i in 1..=args.keys {
        layer.write(&format!("user:{}", i), format!("value-{}", i)).await?;
    }
    info!("Wrote {} records", args.keys);

    // Read phase: the first round fills the cache tiers, later rounds
    // measure warm hit rates
    for round in 1..=args.rounds {
        let reads = (1..=args.keys).map(|i| {
            let layer = Arc::clone(&layer);
            async move { layer.read(&format!("user:{}", i)).await }
        });
        for result in futures::future::join_all(reads).await {
            result?;
        }
        info!("Read round {}/{} complete", round, args.rounds);
    }

    // Report
    let snapshot = layer.stats();
    info!(
        "Statistics: {}",
        serde_json::to_string_pretty(&snapshot)
            .unwrap_or_else(|e| format!("<serialization failed: {}>", e))
    );

    let distribution = layer.shard_distribution().await?;
    for (shard_id, count) in distribution.iter().enumerate() {
        info!("  shard_{}: {} records", shard_id, count);
    }

    info!("Workload complete");
    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}

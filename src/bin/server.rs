//! relayq Server Binary
//!
//! Starts the worker pool and the TCP server.

use std::sync::Arc;

use clap::Parser;
use relayq::network::Server;
use relayq::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// relayq Server
#[derive(Parser, Debug)]
#[command(name = "relayq-server")]
#[command(about = "Line-delimited JSON task relay with a fixed worker pool")]
#[command(version)]
struct Args {
    /// Data directory (SQLite results + JSON blobs)
    #[arg(short, long, default_value = "./relayq_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:5001")]
    listen: String,

    /// Number of worker threads
    #[arg(short, long, default_value = "4")]
    workers: usize,

    /// Max pending tasks before requests are rejected (0 = unbounded)
    #[arg(short, long, default_value = "10000")]
    queue_capacity: usize,

    /// Seconds a connection waits for its result
    #[arg(short = 't', long, default_value = "10")]
    reply_timeout_secs: u64,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Minimum simulated work per task, in milliseconds
    #[arg(long, default_value = "100")]
    min_latency_ms: u64,

    /// Maximum simulated work per task, in milliseconds
    #[arg(long, default_value = "400")]
    max_latency_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,relayq=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("relayq Server v{}", relayq::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .worker_count(args.workers)
        .queue_capacity(args.queue_capacity)
        .reply_timeout_ms(args.reply_timeout_secs.saturating_mul(1000))
        .max_connections(args.max_connections)
        .latency_ms(args.min_latency_ms, args.max_latency_ms)
        .build();

    // Open engine (stores + workers)
    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Engine initialized with {} workers", engine.worker_count());

    let server = match Server::bind(config, Arc::clone(&engine)) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to bind: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = engine.shutdown() {
        tracing::warn!("Engine shutdown: {}", e);
    }
    tracing::info!("Server stopped");
}

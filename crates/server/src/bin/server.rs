//! CobaltKV server binary.
//!
//! Opens the storage engine and serves the JSON line protocol over TCP.

use std::sync::Arc;

use clap::Parser;
use parking_lot::RwLock;
use tracing_subscriber::{fmt, EnvFilter};

use engine::{Config, Engine};
use server::Server;

/// CobaltKV server
#[derive(Parser, Debug)]
#[command(name = "cobalt-server")]
#[command(about = "Embedded LSM-tree key-value store with a TCP front-end")]
#[command(version)]
struct Args {
    /// Data directory (defaults to $COBALT_DATA_DIR)
    #[arg(short, long)]
    data_dir: Option<String>,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:4280")]
    listen: String,

    /// Memtable entries before flushing to an SSTable
    #[arg(short = 't', long, default_value_t = engine::config::DEFAULT_MEMTABLE_THRESHOLD)]
    memtable_threshold: usize,

    /// Bloom filter bits per SSTable
    #[arg(short = 'b', long, default_value_t = engine::config::DEFAULT_BLOOM_FILTER_BITS)]
    bloom_bits: usize,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,engine=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    let mut builder = Config::builder()
        .memtable_threshold(args.memtable_threshold)
        .bloom_filter_bits(args.bloom_bits);
    if let Some(dir) = &args.data_dir {
        builder = builder.output_dir(dir);
    }

    let config = match builder.build() {
        Ok(c) => c,
        Err(error) => {
            tracing::error!(%error, "invalid configuration");
            std::process::exit(1);
        }
    };

    tracing::info!(data_dir = %config.output_dir.display(), "starting database server");

    let engine = match Engine::open(config) {
        Ok(engine) => Arc::new(RwLock::new(engine)),
        Err(error) => {
            tracing::error!(%error, "failed to open engine");
            std::process::exit(1);
        }
    };

    let mut server = Server::new(args.listen, engine);
    if let Err(error) = server.run() {
        tracing::error!(%error, "server failed");
        std::process::exit(1);
    }
}

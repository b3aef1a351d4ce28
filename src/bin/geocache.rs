//! geocache CLI
//!
//! Command-line access to a geocache directory.

use clap::{Parser, Subcommand};
use geocache::{CacheConfig, GeoCache};
use serde_json::Value;
use tracing_subscriber::{fmt, EnvFilter};

/// geocache CLI
#[derive(Parser, Debug)]
#[command(name = "geocache")]
#[command(about = "Inspect and fill a geohash-keyed LMDB cache")]
#[command(version)]
struct Args {
    /// Existing directory holding the cache
    dir: String,

    /// Open the cache read-only
    #[arg(short, long)]
    read_only: bool,

    /// Map size in MB
    #[arg(short, long, default_value = "1024")]
    map_size_mb: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the stored text for a geohash
    Get {
        /// The geohash to look up
        key: String,
    },

    /// Print the stored JSON record for a geohash
    GetJson {
        /// The geohash to look up
        key: String,
    },

    /// Store a text payload
    Put {
        /// The geohash to store under
        key: String,

        /// The payload
        value: String,
    },

    /// Store a JSON record
    PutJson {
        /// The geohash to store under
        key: String,

        /// The record, as JSON text
        json: String,
    },
}

fn main() {
    // Initialize tracing/logging (stderr; stdout carries results)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,geocache=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let map_size = match map_size_bytes(args.map_size_mb) {
        Some(bytes) => bytes,
        None => {
            tracing::error!("Map size of {} MB is too large", args.map_size_mb);
            std::process::exit(1);
        }
    };

    let config = CacheConfig::builder()
        .path(&args.dir)
        .read_only(args.read_only)
        .map_size(map_size)
        .build();

    let cache = match GeoCache::open_with(config) {
        Ok(cache) => cache,
        Err(e) => {
            tracing::error!("Failed to open cache: {}", e);
            std::process::exit(1);
        }
    };

    let code = run(&cache, args.command);
    cache.close();
    std::process::exit(code);
}

/// Megabytes to bytes, `None` on overflow
fn map_size_bytes(mb: usize) -> Option<usize> {
    mb.checked_mul(1024 * 1024)
}

/// Execute one command, returning the process exit status
fn run(cache: &GeoCache, command: Commands) -> i32 {
    match command {
        Commands::Get { key } => match cache.get(&key) {
            Ok(()) => 0,
            Err(e) => {
                tracing::error!("Cannot write to stdout: {}", e);
                1
            }
        },
        Commands::GetJson { key } => match cache.get_json::<Value>(&key) {
            Some(record) => match serde_json::to_string_pretty(&record) {
                Ok(text) => {
                    println!("{}", text);
                    0
                }
                Err(e) => {
                    tracing::error!("Cannot format record: {}", e);
                    1
                }
            },
            None => {
                println!(" [{}] not found", key);
                1
            }
        },
        Commands::Put { key, value } => report(cache.put(&key, &value)),
        Commands::PutJson { key, json } => match serde_json::from_str::<Value>(&json) {
            Ok(record) => report(cache.put_json(&key, &record)),
            Err(e) => {
                tracing::error!("Argument is not valid JSON: {}", e);
                1
            }
        },
    }
}

fn report(outcome: geocache::Result<()>) -> i32 {
    match outcome {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!("put failed ({}): {}", e.code(), e);
            1
        }
    }
}

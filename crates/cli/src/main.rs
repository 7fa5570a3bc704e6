//! # CLI - CobaltKV Interactive Shell
//!
//! A REPL-style front-end for the storage engine. Reads commands from
//! stdin, executes them against a local engine, and prints results to
//! stdout. Works interactively or scripted (pipe commands via stdin).
//!
//! ## Commands
//!
//! ```text
//! SET key value   Insert or update a key-value pair
//! GET key         Look up a key (prints the value or an error)
//! LIST            Print every key=value pair in the store
//! STATS           Print engine debug info
//! EXIT / QUIT     Shut down
//! ```
//!
//! ## Configuration
//!
//! All settings come from environment variables:
//!
//! ```text
//! COBALT_DATA_DIR             Data directory (required)
//! COBALT_MEMTABLE_THRESHOLD   Entries before flush   (default: 1000)
//! COBALT_BLOOM_BITS           Bloom bits per SSTable (default: 10000)
//! ```

use std::io::{self, BufRead, Write};

use anyhow::Result;

use engine::{Config, Engine};

/// Reads a numeric configuration value from the environment, falling back
/// to `default`.
fn env_or(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn main() -> Result<()> {
    let config = Config::builder()
        .memtable_threshold(env_or(
            "COBALT_MEMTABLE_THRESHOLD",
            engine::config::DEFAULT_MEMTABLE_THRESHOLD,
        ))
        .bloom_filter_bits(env_or(
            "COBALT_BLOOM_BITS",
            engine::config::DEFAULT_BLOOM_FILTER_BITS,
        ))
        .build()?;

    let mut engine = Engine::open(config)?;

    println!(
        "CobaltKV started (memtable={} entries, sstables={})",
        engine.memtable_size(),
        engine.sstable_count()
    );
    println!("Commands: SET key value | GET key | LIST | STATS | EXIT");
    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        if let Some(cmd) = parts.next() {
            match cmd.to_uppercase().as_str() {
                "SET" => {
                    if let Some(key) = parts.next() {
                        let value: String = parts.collect::<Vec<&str>>().join(" ");
                        if value.is_empty() {
                            println!("ERR usage: SET key value");
                        } else {
                            match engine.write(key, value.as_bytes()) {
                                Ok(()) => println!("OK"),
                                Err(e) => println!("ERR write failed: {}", e),
                            }
                        }
                    } else {
                        println!("ERR usage: SET key value");
                    }
                }
                "GET" => {
                    if let Some(key) = parts.next() {
                        match engine.read(key) {
                            Ok(value) => println!("{}", String::from_utf8_lossy(&value)),
                            Err(e) => println!("ERR read failed: {}", e),
                        }
                    } else {
                        println!("ERR usage: GET key");
                    }
                }
                "LIST" => {
                    let mut count = 0usize;
                    engine.iter(|key, value| {
                        println!("{}={}", key, String::from_utf8_lossy(value));
                        count += 1;
                        true
                    });
                    if count == 0 {
                        println!("(empty)");
                    } else {
                        println!("({} entries)", count);
                    }
                }
                "STATS" => {
                    println!("{:?}", engine);
                }
                "EXIT" | "QUIT" => {
                    println!("bye");
                    break;
                }
                other => {
                    println!("unknown command: {}", other);
                }
            }
        }

        print!("> ");
        io::stdout().flush().ok();
    }

    Ok(())
}

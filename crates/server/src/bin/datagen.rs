//! Synthetic data generator.
//!
//! Writes `-n` random records through a running server's wire protocol and
//! reports throughput. Useful for filling a store before poking at it with
//! the REPL or the dump tool.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use clap::Parser;

use server::Client;

/// CobaltKV load generator
#[derive(Parser, Debug)]
#[command(name = "cobalt-datagen")]
#[command(about = "Generate synthetic records against a running server")]
struct Args {
    /// Number of records to generate
    #[arg(short, default_value_t = 1000)]
    n: usize,

    /// Size of generated values in bytes
    #[arg(long, default_value_t = 64)]
    size: usize,

    /// Server address
    #[arg(long, default_value = "127.0.0.1:4280")]
    server: String,
}

/// xorshift64* -- small deterministic generator, plenty for synthetic keys.
struct Rng(u64);

impl Rng {
    fn from_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x9e3779b97f4a7c15);
        Self(seed | 1)
    }

    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        x.wrapping_mul(0x2545f4914f6cdd1d)
    }

    fn word(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| char::from(b'a' + (self.next() % 26) as u8))
            .collect()
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.n == 0 {
        println!("Number of records must be positive");
        return Ok(());
    }

    println!("Connecting to server at {}...", args.server);
    let mut client = Client::connect(&args.server)?;

    let mut rng = Rng::from_clock();
    let start = Instant::now();

    for i in 0..args.n {
        let key_len = 3 + (rng.next() % 8) as usize;
        let key = rng.word(key_len);
        let value = rng.word(args.size);

        if let Err(error) = client.set(&key, &value) {
            println!("Error writing record {}: {}", i, error);
            return Ok(());
        }

        if (i + 1) % 1000 == 0 {
            println!("Generated {} records...", i + 1);
        }
    }

    let elapsed = start.elapsed();
    println!(
        "Wrote {} records in {:.2?} ({:.0} records/s)",
        args.n,
        elapsed,
        args.n as f64 / elapsed.as_secs_f64()
    );

    Ok(())
}

//! hitlru demo - drives a cache from the command line and reports its state

use anyhow::Result;
use clap::Parser;
use hitlru::HitCache;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Cache capacity (number of items, 2..=255)
    #[arg(short, long, default_value_t = 8)]
    capacity: u8,

    /// Number of distinct keys to insert
    #[arg(short, long, default_value_t = 12)]
    keys: usize,

    /// Promote every Nth inserted key once more after loading (0 disables)
    #[arg(short, long, default_value_t = 3)]
    promote_every: usize,

    /// Reset the cache before exiting
    #[arg(long)]
    reset: bool,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    info!("Starting hitlru demo v{}", env!("CARGO_PKG_VERSION"));
    info!("Cache capacity: {}", args.capacity);

    let cache = HitCache::new(args.capacity)?;

    for i in 0..args.keys {
        let key = format!("key-{i}");
        if !cache.insert(key.clone(), i) {
            info!("Inserted {} after evicting the least recently used entry", key);
        }
    }

    if args.promote_every > 0 {
        for i in (0..args.keys).step_by(args.promote_every) {
            let key = format!("key-{i}");
            if !cache.promote(key.as_str()) {
                info!("{} is no longer cached", key);
            }
        }
    }

    println!("size:     {}/{}", cache.len(), cache.capacity());
    println!("head:     {}", cache.head_key().unwrap_or_default());
    println!("tail:     {} (hits {})", cache.tail_key().unwrap_or_default(), cache.tail_hit_count());
    println!("order:");
    for key in cache.keys() {
        let hits = cache.hit_count(key.as_str()).unwrap_or(0);
        let value = cache.get(key.as_str()).unwrap_or_default();
        println!("  {key:<10} value={value:<4} hits={hits}");
    }

    let stats = cache.stats();
    println!(
        "stats:    inserts={} overwrites={} evictions={} hits={} misses={} hit_ratio={:.2}",
        stats.inserts,
        stats.overwrites,
        stats.evictions,
        stats.hits,
        stats.misses,
        stats.hit_ratio()
    );

    if args.reset {
        cache.reset();
        info!("Cache reset, {} entries remain", cache.len());
    }

    Ok(())
}

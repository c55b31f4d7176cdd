//! `ketamactl` — inspect ketama key placement.
//!
//! Builds a ring from a node list (config file and/or flags) and reports
//! which node owns which key, using the same placement as spymemcached.
//!
//! # Usage
//!
//! ```text
//! ketamactl -n 10.0.1.1 -n 10.0.1.2 locate user:42 session:abc
//! ketamactl -c ketama.toml ring --limit 20
//! ketamactl -c ketama.toml distribution --samples 100000
//! ketamactl --host example.com=93.184.216.34 demo
//! ```

mod config;

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ketama_placement::{Ring, RingBuilder, RingError};
use tracing::{debug, info};

use config::CliConfig;

/// Node list used by the `demo` command.
const DEMO_NODES: [&str; 3] = ["example.com", "yahoo.com", "google.com"];

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "ketamactl",
    version,
    about = "Ketama consistent hashing key placement"
)]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Node identifier (hostname or IPv4 literal). Replaces the config list.
    #[arg(short, long = "node", global = true)]
    nodes: Vec<String>,

    /// Port shared by every node.
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Ring points per node.
    #[arg(short, long, global = true)]
    repetitions: Option<u32>,

    /// Static resolution `<hostname>=<ipv4>`, added to the `[hosts]` table.
    #[arg(long = "host", global = true, value_parser = config::parse_host_override)]
    hosts: Vec<(String, Ipv4Addr)>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the owning node for each key.
    Locate {
        /// Keys to place.
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Dump ring entries in hash order.
    Ring {
        /// Only print the first N entries.
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show how synthetic keys spread across nodes.
    Distribution {
        /// Number of keys (`key-0`, `key-1`, ...) to place.
        #[arg(short, long, default_value = "100000")]
        samples: usize,
    },

    /// Place `cachekey1` and `cachekey2` on example.com, yahoo.com, google.com.
    Demo,
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref()).context("failed to load config")?;

    setup_tracing(&config.log.level);

    // CLI args override config file values.
    if !cli.nodes.is_empty() {
        config.ring.nodes = cli.nodes;
    }
    if let Some(port) = cli.port {
        config.ring.port = port;
    }
    if let Some(repetitions) = cli.repetitions {
        config.ring.repetitions = repetitions;
    }
    config.hosts.extend(cli.hosts);

    match cli.command {
        Commands::Locate { keys } => cmd_locate(&config, &keys),
        Commands::Ring { limit } => cmd_ring(&config, limit),
        Commands::Distribution { samples } => cmd_distribution(&config, samples),
        Commands::Demo => cmd_demo(&config),
    }
}

/// Initialize the `tracing` subscriber with the given level filter.
///
/// Respects `RUST_LOG` env var if set, otherwise uses the config value.
/// Logs go to stderr so command output stays pipeable.
fn setup_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_ring(config: &CliConfig, nodes: &[String]) -> Result<Ring> {
    info!(
        nodes = nodes.len(),
        port = config.ring.port,
        repetitions = config.ring.repetitions,
        static_hosts = config.hosts.len(),
        "building ring"
    );
    RingBuilder::new(config.ring.port)
        .repetitions(config.ring.repetitions)
        .resolver(config.resolver())
        .build(nodes)
        .context("failed to build ring")
}

// -----------------------------------------------------------------------
// Commands
// -----------------------------------------------------------------------

fn cmd_locate(config: &CliConfig, keys: &[String]) -> Result<()> {
    let ring = build_ring(config, &config.ring.nodes)?;
    for key in keys {
        let node = ring
            .node_for_key(key)
            .with_context(|| format!("failed to locate {key}"))?;
        println!("{key}\t{node}");
    }
    Ok(())
}

fn cmd_ring(config: &CliConfig, limit: Option<usize>) -> Result<()> {
    let ring = build_ring(config, &config.ring.nodes)?;
    anyhow::ensure!(!ring.is_empty(), RingError::EmptyRing);

    let limit = limit.unwrap_or(usize::MAX);
    for (hash, node) in ring.entries().take(limit) {
        println!("{hash}\t{}", node.identifier());
    }
    debug!(total = ring.len(), "dumped ring");
    Ok(())
}

fn cmd_distribution(config: &CliConfig, samples: usize) -> Result<()> {
    anyhow::ensure!(samples > 0, "--samples must be at least 1");
    let ring = build_ring(config, &config.ring.nodes)?;

    let mut counts: BTreeMap<&str, usize> = ring
        .nodes()
        .iter()
        .map(|n| (n.identifier(), 0))
        .collect();
    for i in 0..samples {
        let node = ring.node_for_key(format!("key-{i}"))?;
        *counts.entry(node).or_default() += 1;
    }

    let ideal = samples as f64 / counts.len().max(1) as f64;
    println!("{:<32} {:>10} {:>8} {:>8}", "node", "keys", "share", "vs-ideal");
    for (node, count) in &counts {
        println!(
            "{:<32} {:>10} {:>7.2}% {:>+7.2}%",
            node,
            count,
            *count as f64 * 100.0 / samples as f64,
            (*count as f64 - ideal) * 100.0 / ideal,
        );
    }
    Ok(())
}

fn cmd_demo(config: &CliConfig) -> Result<()> {
    let nodes: Vec<String> = DEMO_NODES.iter().map(|s| s.to_string()).collect();
    let ring = build_ring(config, &nodes)?;
    for key in ["cachekey1", "cachekey2", "cachekey2"] {
        println!("{}", ring.node_for_key(key)?);
    }
    Ok(())
}

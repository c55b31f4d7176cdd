//! Shared harness for ketama ring integration tests.
//!
//! Provides a pinned resolver for the well-known demo hostnames, node list
//! helpers, and a deterministic key corpus.

use std::net::Ipv4Addr;
use std::sync::Arc;

use ketama_placement::{DEFAULT_PORT, Ring, RingBuilder, StaticResolver};

/// Node list used by the `ketamactl demo` command.
pub const DEMO_NODES: [&str; 3] = ["example.com", "yahoo.com", "google.com"];

/// Resolver that answers the demo hostnames with fixed addresses.
///
/// Pinning addresses keeps ring layouts stable regardless of live DNS.
pub fn demo_resolver() -> Arc<StaticResolver> {
    Arc::new(StaticResolver::new([
        ("example.com", Ipv4Addr::new(93, 184, 216, 34)),
        ("yahoo.com", Ipv4Addr::new(74, 6, 143, 25)),
        ("google.com", Ipv4Addr::new(142, 250, 72, 14)),
    ]))
}

/// Build the demo ring (port 11211, default repetitions, pinned DNS).
pub fn demo_ring() -> Ring {
    RingBuilder::new(DEFAULT_PORT)
        .resolver(demo_resolver())
        .build(&DEMO_NODES)
        .expect("demo ring builds with pinned resolver")
}

/// `count` IPv4 literal node identifiers: `10.0.0.1`, `10.0.0.2`, ...
pub fn ip_nodes(count: usize) -> Vec<String> {
    (1..=count)
        .map(|i| format!("10.0.{}.{}", i / 256, i % 256))
        .collect()
}

/// Build a ring over IPv4 literal nodes with default settings.
pub fn ip_ring(nodes: &[String]) -> Ring {
    RingBuilder::new(DEFAULT_PORT)
        .build(nodes)
        .expect("IPv4 literal rings need no resolution")
}

/// Deterministic key corpus `key-0 .. key-{count-1}`.
pub fn sample_keys(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("key-{i}")).collect()
}

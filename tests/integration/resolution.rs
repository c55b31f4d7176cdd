//! Integration test: hostname resolution at build time.

use std::net::Ipv4Addr;
use std::sync::Arc;

use ketama_integration_tests::{DEMO_NODES, demo_resolver};
use ketama_placement::{DEFAULT_PORT, Node, NodeHost, RingBuilder, RingError, StaticResolver};

#[test]
fn test_unresolvable_node_aborts_build() {
    let err = RingBuilder::new(DEFAULT_PORT)
        .resolver(demo_resolver())
        .build(&["example.com", "nonexistent.invalid", "google.com"])
        .unwrap_err();
    assert!(
        matches!(err, RingError::Resolution { ref hostname, .. } if hostname == "nonexistent.invalid")
    );
    assert!(err.to_string().contains("nonexistent.invalid"));
}

#[test]
fn test_resolved_address_changes_placement() {
    let moved = StaticResolver::new([
        ("example.com", Ipv4Addr::new(93, 184, 216, 35)),
        ("yahoo.com", Ipv4Addr::new(74, 6, 143, 25)),
        ("google.com", Ipv4Addr::new(142, 250, 72, 14)),
    ]);
    let a = RingBuilder::new(DEFAULT_PORT)
        .resolver(demo_resolver())
        .build(&DEMO_NODES)
        .unwrap();
    let b = RingBuilder::new(DEFAULT_PORT)
        .resolver(Arc::new(moved))
        .build(&DEMO_NODES)
        .unwrap();

    // The hostname is part of the node key, and so is its address.
    let positions = |ring: &ketama_placement::Ring| -> Vec<u32> {
        ring.entries()
            .filter(|(_, n)| n.identifier() == "example.com")
            .map(|(h, _)| h)
            .collect()
    };
    assert_ne!(positions(&a), positions(&b));
}

#[test]
fn test_mixed_node_kinds() {
    let ring = RingBuilder::new(DEFAULT_PORT)
        .resolver(demo_resolver())
        .build(&["example.com", "10.0.1.1"])
        .unwrap();
    let kinds: Vec<&NodeHost> = ring.nodes().iter().map(Node::host).collect();
    assert_eq!(
        kinds,
        vec![
            &NodeHost::Hostname("example.com".into()),
            &NodeHost::Ipv4Literal("10.0.1.1".into()),
        ]
    );
    assert_eq!(ring.len(), 320);
}

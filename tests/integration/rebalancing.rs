//! Integration test: topology changes move only a fair share of keys.

use ketama_integration_tests::{ip_nodes, ip_ring, sample_keys};
use ketama_placement::Ring;

/// Adding one node to N should move about 1/(N+1) of the keys, all of them
/// onto the new node.
#[test]
fn test_adding_node_moves_fair_share() {
    let keys = sample_keys(20_000);

    for n in [2usize, 4, 9] {
        let nodes = ip_nodes(n + 1);
        let old = ip_ring(&nodes[..n]);
        let new = ip_ring(&nodes);

        let migrations = Ring::diff(&old, &new, &keys).unwrap();
        let moved = migrations.len() as f64 / keys.len() as f64;
        let expected = 1.0 / (n + 1) as f64;

        assert!(
            (moved - expected).abs() < expected * 0.35,
            "n={n}: moved {moved:.3}, expected about {expected:.3}"
        );
        for m in &migrations {
            assert_eq!(m.to, nodes[n], "keys may only move to the new node");
        }
    }
}

/// Removing a node only moves the keys it owned.
#[test]
fn test_removing_node_only_moves_its_keys() {
    let keys = sample_keys(10_000);
    let nodes = ip_nodes(5);
    let removed = &nodes[2];
    let remaining: Vec<String> = nodes.iter().filter(|n| *n != removed).cloned().collect();

    let old = ip_ring(&nodes);
    let new = ip_ring(&remaining);

    for m in Ring::diff(&old, &new, &keys).unwrap() {
        assert_eq!(&m.from, removed, "key {:?} moved off a surviving node", m.key);
    }
}

/// With 160 points per node, ownership stays within a reasonable band.
#[test]
fn test_keys_spread_across_nodes() {
    let keys = sample_keys(50_000);
    let nodes = ip_nodes(5);
    let ring = ip_ring(&nodes);

    for node in &nodes {
        let owned = keys
            .iter()
            .filter(|k| ring.node_for_key(k).unwrap() == node)
            .count();
        let share = owned as f64 / keys.len() as f64;
        assert!(
            (0.1..=0.3).contains(&share),
            "{node} owns {share:.3} of keys"
        );
    }
}

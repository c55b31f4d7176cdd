//! Integration test: lock-free lookups and ring replacement under load.

use std::sync::Arc;
use std::thread;

use ketama_integration_tests::{ip_nodes, ip_ring, sample_keys};
use ketama_placement::SharedRing;

#[test]
#[ntest::timeout(30000)]
fn test_concurrent_lookups_agree() {
    let ring = Arc::new(ip_ring(&ip_nodes(8)));
    let keys = Arc::new(sample_keys(2_000));
    let expected: Vec<String> = keys
        .iter()
        .map(|k| ring.node_for_key(k).unwrap().to_string())
        .collect();
    let expected = Arc::new(expected);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ring = ring.clone();
            let keys = keys.clone();
            let expected = expected.clone();
            thread::spawn(move || {
                for (key, owner) in keys.iter().zip(expected.iter()) {
                    assert_eq!(ring.node_for_key(key).unwrap(), owner);
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
}

#[test]
#[ntest::timeout(30000)]
fn test_replace_while_reading() {
    let nodes = ip_nodes(6);
    let shared = Arc::new(SharedRing::new(ip_ring(&nodes[..3])));
    let keys = Arc::new(sample_keys(500));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let shared = shared.clone();
            let keys = keys.clone();
            let nodes = nodes.clone();
            thread::spawn(move || {
                for _ in 0..20 {
                    let ring = shared.load();
                    for key in keys.iter() {
                        let owner = ring.node_for_key(key).unwrap();
                        assert!(nodes.iter().any(|n| n == owner));
                    }
                }
            })
        })
        .collect();

    for n in 4..=nodes.len() {
        shared.replace(ip_ring(&nodes[..n]));
    }

    for r in readers {
        r.join().unwrap();
    }
    assert_eq!(shared.load().node_count(), 6);
}

//! Ketama ring construction and lookup.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::RingError;
use crate::hasher;
use crate::node::Node;
use crate::resolver::{Resolver, SystemResolver};

/// Repetitions used by spymemcached: 40 replica keys, 160 ring points per node.
pub const DEFAULT_REPETITIONS: u32 = 160;

/// Conventional memcached port.
pub const DEFAULT_PORT: u16 = 11211;

/// One position on the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct VirtualNode {
    /// Position on the 32-bit ring.
    hash: u32,
    /// Index of the owning node in `Ring::nodes`.
    node: u32,
}

/// A key whose owner differs between two rings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    /// The key that moved.
    pub key: Vec<u8>,
    /// Owner in the old ring.
    pub from: String,
    /// Owner in the new ring.
    pub to: String,
}

/// Immutable Ketama ring.
///
/// Entries are ordered by `(hash, node identifier)`. The identifier
/// tie-break only matters on a 32-bit collision, but every client that wants
/// to agree with this one on the same node list must apply it the same way.
///
/// A ring has no mutators: to change topology, build a new one (see
/// [`SharedRing`](crate::SharedRing) for swapping it in under readers).
#[derive(Debug, Clone)]
pub struct Ring {
    entries: Vec<VirtualNode>,
    nodes: Vec<Node>,
    port: u16,
    repetitions: u32,
}

impl Ring {
    /// Build a ring using the system resolver.
    ///
    /// Shorthand for `RingBuilder::new(port).repetitions(repetitions).build(nodes)`.
    pub fn new<S: AsRef<str>>(
        nodes: &[S],
        port: u16,
        repetitions: u32,
    ) -> Result<Self, RingError> {
        RingBuilder::new(port).repetitions(repetitions).build(nodes)
    }

    /// Return the identifier of the node that owns `key`.
    pub fn node_for_key(&self, key: impl AsRef<[u8]>) -> Result<&str, RingError> {
        self.locate(key).map(Node::identifier)
    }

    /// Return the node that owns `key`.
    pub fn locate(&self, key: impl AsRef<[u8]>) -> Result<&Node, RingError> {
        self.node_for_hash(hasher::extract_one(key.as_ref()))
    }

    /// Return the node owning ring position `hash`.
    ///
    /// Picks the first entry whose hash is `>= hash`, wrapping to the
    /// smallest entry when `hash` is past the last one.
    pub fn node_for_hash(&self, hash: u32) -> Result<&Node, RingError> {
        let idx = self.ceiling_index(hash)?;
        Ok(self.node_at(self.entries[idx]))
    }

    fn ceiling_index(&self, hash: u32) -> Result<usize, RingError> {
        if self.entries.is_empty() {
            return Err(RingError::EmptyRing);
        }
        let idx = self.entries.partition_point(|e| e.hash < hash);
        Ok(if idx == self.entries.len() { 0 } else { idx })
    }

    fn node_at(&self, entry: VirtualNode) -> &Node {
        &self.nodes[entry.node as usize]
    }

    /// Compute which keys change owner between two rings.
    pub fn diff<K: AsRef<[u8]>>(
        old: &Ring,
        new: &Ring,
        keys: &[K],
    ) -> Result<Vec<Migration>, RingError> {
        let mut migrations = Vec::new();

        for key in keys {
            let key = key.as_ref();
            let from = old.node_for_key(key)?;
            let to = new.node_for_key(key)?;
            if from != to {
                migrations.push(Migration {
                    key: key.to_vec(),
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
        }

        Ok(migrations)
    }

    /// Iterate over `(hash, node)` in ring order.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = (u32, &Node)> + '_ {
        self.entries.iter().map(|e| (e.hash, self.node_at(*e)))
    }

    /// The nodes in the order they were supplied.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return the number of ring entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ring has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the number of physical nodes the ring was built from.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Port shared by every node.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Repetition count requested at build time.
    pub fn repetitions(&self) -> u32 {
        self.repetitions
    }

    fn from_parts(
        nodes: Vec<Node>,
        mut entries: Vec<VirtualNode>,
        port: u16,
        repetitions: u32,
    ) -> Self {
        entries.sort_by(|a, b| compare_entries(&nodes, a, b));
        Self {
            entries,
            nodes,
            port,
            repetitions,
        }
    }
}

/// `(hash, identifier)` ordering for ring entries.
fn compare_entries(nodes: &[Node], a: &VirtualNode, b: &VirtualNode) -> Ordering {
    a.hash.cmp(&b.hash).then_with(|| {
        nodes[a.node as usize]
            .identifier()
            .cmp(nodes[b.node as usize].identifier())
    })
}

/// Builds [`Ring`]s from node lists.
///
/// Each node contributes `repetitions / 4` replica keys (integer division),
/// and each key's MD5 digest yields four ring positions. A repetition count
/// that is not a multiple of four is truncated, never rounded up.
#[derive(Clone)]
pub struct RingBuilder {
    port: u16,
    repetitions: u32,
    resolver: Arc<dyn Resolver>,
}

impl RingBuilder {
    /// Start a builder for nodes listening on `port`.
    pub fn new(port: u16) -> Self {
        Self {
            port,
            repetitions: DEFAULT_REPETITIONS,
            resolver: Arc::new(SystemResolver),
        }
    }

    /// Set the repetition count (default [`DEFAULT_REPETITIONS`]).
    pub fn repetitions(mut self, repetitions: u32) -> Self {
        self.repetitions = repetitions;
        self
    }

    /// Use `resolver` for hostname-form nodes instead of the system resolver.
    pub fn resolver(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Build the ring for `nodes`.
    ///
    /// Hostname nodes are resolved once each, in list order. The first
    /// resolution failure aborts the build.
    pub fn build<S: AsRef<str>>(&self, nodes: &[S]) -> Result<Ring, RingError> {
        let replicas = self.repetitions / hasher::POINTS_PER_DIGEST as u32;
        if self.repetitions % hasher::POINTS_PER_DIGEST as u32 != 0 {
            warn!(
                repetitions = self.repetitions,
                effective = replicas * hasher::POINTS_PER_DIGEST as u32,
                "repetition count is not a multiple of 4, truncating"
            );
        }

        let nodes: Vec<Node> = nodes
            .iter()
            .map(|id| Node::new(id.as_ref(), self.port))
            .collect();

        let mut entries =
            Vec::with_capacity(nodes.len() * replicas as usize * hasher::POINTS_PER_DIGEST);

        for (idx, node) in nodes.iter().enumerate() {
            let formatter = node.key_formatter(self.resolver.as_ref())?;
            for replica in 0..replicas {
                let digest = hasher::digest(formatter.replica_key(replica).as_bytes());
                for hash in hasher::extract_all(&digest) {
                    entries.push(VirtualNode {
                        hash,
                        node: idx as u32,
                    });
                }
            }
        }

        let ring = Ring::from_parts(nodes, entries, self.port, self.repetitions);
        debug!(
            nodes = ring.node_count(),
            entries = ring.len(),
            port = self.port,
            repetitions = self.repetitions,
            "built ketama ring"
        );
        Ok(ring)
    }
}

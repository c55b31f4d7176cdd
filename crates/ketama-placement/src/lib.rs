//! Ketama consistent hashing ring.
//!
//! This crate places cache keys on a fixed set of nodes the way the
//! spymemcached client does, so that any client following the same scheme
//! sends a given key to the same node:
//!
//! - [`hasher`] turns MD5 digests into 32-bit ring positions.
//! - [`Node`] classifies an identifier as an IPv4 literal or a hostname and
//!   formats its per-replica keys.
//! - [`RingBuilder`] expands nodes into 160 positions each (by default) and
//!   sorts them into an immutable [`Ring`].
//! - [`Ring::node_for_key`] finds the first position at or after a key's hash,
//!   wrapping around past the top of the ring.
//!
//! Hostnames are resolved through an injected [`Resolver`]. Topology changes
//! mean building a new ring; [`SharedRing`] swaps it in under live readers.

pub mod hasher;

mod error;
mod node;
mod resolver;
mod ring;
mod shared;

pub use error::RingError;
pub use node::{Node, NodeHost, NodeKeyFormatter};
pub use resolver::{Resolver, StaticResolver, SystemResolver};
pub use ring::{DEFAULT_PORT, DEFAULT_REPETITIONS, Migration, Ring, RingBuilder};
pub use shared::SharedRing;

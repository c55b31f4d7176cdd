//! Atomic ring replacement for long-lived readers.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use crate::ring::Ring;

/// Holds the current [`Ring`] and lets a new one be swapped in.
///
/// Readers take a snapshot with [`load`](Self::load) and look keys up
/// without holding the lock. A topology change builds a fresh ring and
/// installs it with [`replace`](Self::replace); snapshots taken earlier keep
/// serving from the old ring until dropped.
#[derive(Debug)]
pub struct SharedRing {
    current: RwLock<Arc<Ring>>,
}

impl SharedRing {
    /// Wrap an initial ring.
    pub fn new(ring: Ring) -> Self {
        Self {
            current: RwLock::new(Arc::new(ring)),
        }
    }

    /// Return the ring currently installed.
    pub fn load(&self) -> Arc<Ring> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Install `ring` and return the one it replaced.
    pub fn replace(&self, ring: Ring) -> Arc<Ring> {
        let ring = Arc::new(ring);
        let old = {
            let mut current = self
                .current
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *current, ring.clone())
        };
        info!(
            old_nodes = old.node_count(),
            new_nodes = ring.node_count(),
            entries = ring.len(),
            "replaced ketama ring"
        );
        old
    }
}

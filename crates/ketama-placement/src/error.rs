//! Error types for ring construction and lookup.

/// Errors produced while building or querying a [`Ring`](crate::Ring).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RingError {
    /// A hostname-form node could not be resolved to an IPv4 address.
    ///
    /// Construction stops at the first failure; no partial ring is returned.
    #[error("cannot resolve hostname {hostname}: {reason}")]
    Resolution {
        /// The hostname that failed to resolve.
        hostname: String,
        /// Why resolution failed.
        reason: String,
    },

    /// A lookup was attempted against a ring with no entries.
    #[error("ring is empty: no nodes to place keys on")]
    EmptyRing,
}

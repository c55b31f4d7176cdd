//! Hostname resolution for hostname-form nodes.
//!
//! The ring never talks to DNS itself: [`RingBuilder`](crate::RingBuilder)
//! is handed a [`Resolver`] and calls it once per hostname node. Tests plug
//! in a [`StaticResolver`] to keep ring layouts reproducible.

use std::collections::HashMap;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, ToSocketAddrs};
use std::sync::Arc;

use tracing::debug;

use crate::error::RingError;

/// Resolves a hostname to the IPv4 address embedded in its node keys.
///
/// Implementations must be `Send + Sync` so a builder can be shared across
/// threads. Resolution may block; callers that need a deadline must enforce
/// it inside their implementation.
pub trait Resolver: Send + Sync {
    /// Resolve `hostname` to a single IPv4 address.
    fn resolve_ipv4(&self, hostname: &str) -> Result<Ipv4Addr, RingError>;
}

/// Resolver backed by the operating system (`getaddrinfo`).
///
/// Returns the first IPv4 answer, ignoring IPv6 ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    fn resolve_ipv4(&self, hostname: &str) -> Result<Ipv4Addr, RingError> {
        let addrs = (hostname, 0)
            .to_socket_addrs()
            .map_err(|e| RingError::Resolution {
                hostname: hostname.to_string(),
                reason: e.to_string(),
            })?;

        let ip = addrs
            .filter_map(|addr| match addr.ip() {
                IpAddr::V4(v4) => Some(v4),
                IpAddr::V6(_) => None,
            })
            .next()
            .ok_or_else(|| RingError::Resolution {
                hostname: hostname.to_string(),
                reason: "no IPv4 address".to_string(),
            })?;

        debug!(hostname, %ip, "resolved node hostname");
        Ok(ip)
    }
}

/// Resolver answering from a fixed table.
///
/// Names missing from the table go to the fallback resolver if one is set,
/// and fail otherwise.
#[derive(Clone, Default)]
pub struct StaticResolver {
    hosts: HashMap<String, Ipv4Addr>,
    fallback: Option<Arc<dyn Resolver>>,
}

impl StaticResolver {
    /// Create a resolver from `(hostname, address)` pairs.
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = (S, Ipv4Addr)>,
        S: Into<String>,
    {
        Self {
            hosts: hosts.into_iter().map(|(h, ip)| (h.into(), ip)).collect(),
            fallback: None,
        }
    }

    /// Send names missing from the table to `fallback`.
    pub fn with_fallback(mut self, fallback: Arc<dyn Resolver>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Number of hostnames in the table.
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

impl fmt::Debug for StaticResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticResolver")
            .field("hosts", &self.hosts)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl Resolver for StaticResolver {
    fn resolve_ipv4(&self, hostname: &str) -> Result<Ipv4Addr, RingError> {
        if let Some(ip) = self.hosts.get(hostname) {
            return Ok(*ip);
        }
        match &self.fallback {
            Some(fallback) => fallback.resolve_ipv4(hostname),
            None => Err(RingError::Resolution {
                hostname: hostname.to_string(),
                reason: "not in static host table".to_string(),
            }),
        }
    }
}

//! Physical nodes and the per-replica key strings hashed onto the ring.

use std::fmt;
use std::net::Ipv4Addr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::RingError;
use crate::resolver::Resolver;

/// Loose dotted-quad match: four groups of one to three ASCII digits.
///
/// Octets are not range-checked, so `999.1.1.1` is an IP literal. Other
/// clients use the same pattern and must see the same node keys.
static IPV4_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}$")
        .expect("valid IPv4 literal pattern")
});

/// How a node was named in the node list, decided once at ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeHost {
    /// A dotted-quad literal, used verbatim.
    Ipv4Literal(String),
    /// A hostname that must be resolved before its keys can be formatted.
    Hostname(String),
}

impl NodeHost {
    /// Classify a node identifier.
    pub fn parse(identifier: &str) -> Self {
        if IPV4_LITERAL.is_match(identifier) {
            Self::Ipv4Literal(identifier.to_string())
        } else {
            Self::Hostname(identifier.to_string())
        }
    }

    /// The identifier exactly as it appeared in the node list.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ipv4Literal(s) | Self::Hostname(s) => s,
        }
    }
}

/// A physical cache node: identifier plus port.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node {
    host: NodeHost,
    port: u16,
}

impl Node {
    /// Create a node from an identifier string and port.
    pub fn new(identifier: &str, port: u16) -> Self {
        Self {
            host: NodeHost::parse(identifier),
            port,
        }
    }

    /// The node's host, tagged by kind.
    pub fn host(&self) -> &NodeHost {
        &self.host
    }

    /// The identifier as given in the node list.
    pub fn identifier(&self) -> &str {
        self.host.as_str()
    }

    /// The node's port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Resolve the node (if needed) and return its key formatter.
    ///
    /// Hostname-form nodes hit the resolver exactly once here; IP literals
    /// never do.
    pub fn key_formatter(&self, resolver: &dyn Resolver) -> Result<NodeKeyFormatter, RingError> {
        match &self.host {
            NodeHost::Ipv4Literal(ip) => Ok(NodeKeyFormatter::for_ip_literal(ip, self.port)),
            NodeHost::Hostname(hostname) => {
                let ip = resolver.resolve_ipv4(hostname)?;
                Ok(NodeKeyFormatter::for_hostname(hostname, ip, self.port))
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.identifier(), self.port)
    }
}

/// Formats the string hashed for each replica of one node.
///
/// - IP literal: `"<ip>:<port>-<replica>"`
/// - hostname: `"<hostname>/<ip>:<port>-<replica>"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeKeyFormatter {
    prefix: String,
}

impl NodeKeyFormatter {
    /// Build a formatter for a hostname already resolved to `ip`.
    pub fn for_hostname(hostname: &str, ip: Ipv4Addr, port: u16) -> Self {
        Self {
            prefix: format!("{hostname}/{ip}:{port}"),
        }
    }

    /// Build a formatter for an IP literal.
    pub fn for_ip_literal(ip: &str, port: u16) -> Self {
        Self {
            prefix: format!("{ip}:{port}"),
        }
    }

    /// The key for replica `replica`.
    pub fn replica_key(&self, replica: u32) -> String {
        format!("{}-{replica}", self.prefix)
    }
}

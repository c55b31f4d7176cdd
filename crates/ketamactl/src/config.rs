//! TOML configuration for `ketamactl`.
//!
//! Lookup order: `--config <path>`, then `<config dir>/ketamactl/config.toml`
//! if it exists, then built-in defaults.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use ketama_placement::{DEFAULT_PORT, DEFAULT_REPETITIONS, Resolver, StaticResolver, SystemResolver};
use serde::Deserialize;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Ring layout.
    pub ring: RingSection,
    /// Static hostname resolutions, `hostname = "a.b.c.d"`.
    pub hosts: BTreeMap<String, Ipv4Addr>,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[ring]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RingSection {
    /// Node identifiers: hostnames or dotted-quad IPv4 literals.
    pub nodes: Vec<String>,
    /// Port shared by every node.
    pub port: u16,
    /// Ring points per node (truncated to a multiple of 4).
    pub repetitions: u32,
}

impl Default for RingSection {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            port: DEFAULT_PORT,
            repetitions: DEFAULT_REPETITIONS,
        }
    }
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"warn"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CliConfig {
    /// Load config from `path`, the default location, or defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => match default_path() {
                Some(p) if p.exists() => Self::from_file(&p),
                _ => Ok(Self::default()),
            },
        }
    }

    fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Parse config from a TOML string (used in tests).
    #[cfg(test)]
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Resolver for hostname nodes: the `[hosts]` table first, then DNS.
    pub fn resolver(&self) -> Arc<dyn Resolver> {
        if self.hosts.is_empty() {
            return Arc::new(SystemResolver);
        }
        let table = self.hosts.iter().map(|(host, ip)| (host.clone(), *ip));
        Arc::new(StaticResolver::new(table).with_fallback(Arc::new(SystemResolver)))
    }
}

/// `<config dir>/ketamactl/config.toml`, if the platform has a config dir.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ketamactl").join("config.toml"))
}

/// Parse a `--host name=a.b.c.d` override.
pub fn parse_host_override(s: &str) -> anyhow::Result<(String, Ipv4Addr)> {
    let (host, ip) = s
        .split_once('=')
        .context("expected <hostname>=<ipv4 address>")?;
    anyhow::ensure!(!host.is_empty(), "empty hostname in host override");
    let ip: Ipv4Addr = ip
        .trim()
        .parse()
        .with_context(|| format!("invalid IPv4 address for {host}"))?;
    Ok((host.trim().to_string(), ip))
}

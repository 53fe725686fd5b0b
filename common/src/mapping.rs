//! # Port Mapping Model
//!
//! Shared types for NAT forwarding rules: the entries read back from a
//! gateway, the endpoint specs used to request new rules, and the
//! client-side filters applied after enumeration.

use std::fmt;
use std::str::FromStr;

use regex_lite::Regex;

/// Transport protocol of a forwarding rule.
///
/// Serialized uppercase on the wire (`TCP`/`UDP`), reported lowercase in
/// enumerated entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "TCP"),
            Protocol::Udp => write!(f, "UDP"),
        }
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            other => Err(format!("invalid protocol: {other}")),
        }
    }
}

/// One side of a requested mapping: just a port, or a host plus port.
///
/// A missing private host defaults to the local interface address the
/// gateway was discovered from; a missing public host means "any remote".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointSpec {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl From<u16> for EndpointSpec {
    fn from(port: u16) -> Self {
        Self {
            host: None,
            port: Some(port),
        }
    }
}

impl From<(&str, u16)> for EndpointSpec {
    fn from((host, port): (&str, u16)) -> Self {
        Self {
            host: Some(host.to_string()),
            port: Some(port),
        }
    }
}

impl FromStr for EndpointSpec {
    type Err = String;

    /// Parses `"8080"` or `"192.168.1.5:80"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(port) = s.parse::<u16>() {
            return Ok(port.into());
        }
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("invalid endpoint: {s}"))?;
        let port: u16 = port
            .parse()
            .map_err(|_| format!("invalid port in endpoint: {s}"))?;
        if host.is_empty() {
            return Err(format!("invalid endpoint: {s}"));
        }
        Ok((host, port).into())
    }
}

/// A concrete host/port pair as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Empty string when the gateway reports no remote host restriction.
    pub host: String,
    pub port: u16,
}

/// One active forwarding rule read back from the gateway's mapping table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMapping {
    pub public: Endpoint,
    pub private: Endpoint,
    pub protocol: Protocol,
    pub enabled: bool,
    pub description: String,
    /// Remaining lease, in seconds.
    pub ttl: u32,
    /// True iff the private host is the interface this client reached the
    /// gateway from.
    pub local: bool,
}

/// Request to create a forwarding rule.
#[derive(Debug, Clone, Default)]
pub struct AddMapping {
    pub public: EndpointSpec,
    pub private: EndpointSpec,
    /// Defaults to [`Protocol::Tcp`].
    pub protocol: Option<Protocol>,
    /// Defaults to the library tag.
    pub description: Option<String>,
    /// Lease duration in seconds; defaults to 1800.
    pub ttl: Option<u32>,
}

/// Request to delete a forwarding rule.
#[derive(Debug, Clone, Default)]
pub struct RemoveMapping {
    pub public: EndpointSpec,
    /// Defaults to [`Protocol::Tcp`].
    pub protocol: Option<Protocol>,
}

/// Description predicate for mapping enumeration.
#[derive(Debug, Clone)]
pub enum DescriptionFilter {
    /// Exact substring containment.
    Substring(String),
    /// Regular expression match.
    Pattern(Regex),
}

impl DescriptionFilter {
    pub fn matches(&self, description: &str) -> bool {
        match self {
            DescriptionFilter::Substring(needle) => description.contains(needle.as_str()),
            DescriptionFilter::Pattern(pattern) => pattern.is_match(description),
        }
    }
}

/// Client-side filter applied after the enumeration loop completes.
#[derive(Debug, Clone, Default)]
pub struct MappingFilter {
    /// Keep only entries pointing at this machine.
    pub local: bool,
    pub description: Option<DescriptionFilter>,
}

impl MappingFilter {
    pub fn accepts(&self, entry: &PortMapping) -> bool {
        if self.local && !entry.local {
            return false;
        }
        match &self.description {
            Some(filter) => filter.matches(&entry.description),
            None => true,
        }
    }
}

use std::fmt;
use std::hash::{Hash, Hasher};
use serde::{Serialize, Deserialize};
use crate::labels::Labels;

/// Transport protocol of a service port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Grpc,
    Http,
    Http2,
    Https,
    Tcp,
    Udp,
    Mongo,
    Redis,
}

impl Protocol {
    /// Case-insensitive lookup. Returns `None` for names the mesh does not support.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "grpc" => Some(Self::Grpc),
            "http" => Some(Self::Http),
            "http2" => Some(Self::Http2),
            "https" => Some(Self::Https),
            "tcp" => Some(Self::Tcp),
            "udp" => Some(Self::Udp),
            "mongo" => Some(Self::Mongo),
            "redis" => Some(Self::Redis),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grpc => "grpc",
            Self::Http => "http",
            Self::Http2 => "http2",
            Self::Https => "https",
            Self::Tcp => "tcp",
            Self::Udp => "udp",
            Self::Mongo => "mongo",
            Self::Redis => "redis",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named service port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    /// Filter key used by mesh components, e.g. "http"
    pub name: String,

    /// Port number, 0 when the registry reported none
    pub number: u16,

    pub protocol: Protocol,
}

/// A routable workload group, identified by its hostname.
///
/// Equality and hashing consider only `hostname`: two values describing the
/// same hostname are the same service even if they were assembled from
/// different snapshots of the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    /// Fully-qualified mesh hostname, e.g. "reviews.service.consul"
    pub hostname: String,

    /// Service address advertised by the registry, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Ports observed for this service
    #[serde(default)]
    pub ports: Vec<Port>,

    /// Set when the service lives outside the mesh
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_name: Option<String>,
}

impl Service {
    /// A service known only by its hostname.
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            address: None,
            ports: Vec::new(),
            external_name: None,
        }
    }

    pub fn port(&self, name: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.name == name)
    }

    pub fn is_external(&self) -> bool {
        self.external_name.is_some()
    }
}

impl PartialEq for Service {
    fn eq(&self, other: &Self) -> bool {
        self.hostname == other.hostname
    }
}

impl Eq for Service {}

impl Hash for Service {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hostname.hash(state);
    }
}

/// Network address of one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkEndpoint {
    /// IP address or hostname the instance listens on
    pub address: String,

    pub port: u16,

    pub service_port: Port,
}

/// One concrete endpoint backing a [`Service`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInstance {
    /// Copy of the owning service's identity
    pub service: Service,

    pub endpoint: NetworkEndpoint,

    pub labels: Labels,

    /// Datacenter the instance was reported from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
}

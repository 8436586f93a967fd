use std::collections::HashMap;
use mesh_model::{HostnameCodec, Labels, NetworkEndpoint, Port, Protocol, Service, ServiceInstance};
use crate::registry::CatalogRecord;

/// Default node-metadata key carrying a protocol hint.
pub const DEFAULT_PROTOCOL_KEY: &str = "protocol";

/// Node-metadata key marking a service as external to the mesh.
pub const EXTERNAL_KEY: &str = "external";

/// Separator between label key and value in a service tag.
pub const TAG_SEPARATOR: char = '|';

/// Converts registry tags and node metadata into labels and ports.
///
/// When a node carries no protocol hint its ports are treated as
/// `default_protocol` (HTTP unless configured otherwise) and named after it,
/// so a port filter on `"http"` selects them.
#[derive(Debug, Clone)]
pub struct TagTranslator {
    protocol_key: String,
    default_protocol: Protocol,
}

impl TagTranslator {
    pub fn new(protocol_key: impl Into<String>, default_protocol: Protocol) -> Self {
        Self {
            protocol_key: protocol_key.into(),
            default_protocol,
        }
    }

    pub fn default_protocol(&self) -> Protocol {
        self.default_protocol
    }

    /// Parse `key|value` tags. Tags without a separator are skipped and the
    /// last occurrence of a key wins.
    pub fn parse_tags<S: AsRef<str>>(&self, tags: &[S]) -> Labels {
        let mut labels = Labels::new();
        for tag in tags {
            let tag = tag.as_ref();
            match tag.split_once(TAG_SEPARATOR) {
                Some((key, value)) => {
                    labels.insert(key, value);
                }
                None => {
                    tracing::debug!("Tag {:?} ignored, not of the form key|value", tag);
                }
            }
        }
        labels
    }

    /// Raw protocol hint from node metadata, if set and non-empty.
    fn protocol_hint<'a>(&self, node_meta: &'a HashMap<String, String>) -> Option<&'a str> {
        node_meta
            .get(&self.protocol_key)
            .map(String::as_str)
            .filter(|hint| !hint.is_empty())
    }

    /// Protocol advertised by a node. Unknown hints fall back to TCP.
    pub fn infer_protocol(&self, node_meta: &HashMap<String, String>) -> Protocol {
        match self.protocol_hint(node_meta) {
            None => self.default_protocol,
            Some(hint) => Protocol::parse(hint).unwrap_or_else(|| {
                tracing::warn!("Unsupported protocol hint {:?}, treating as tcp", hint);
                Protocol::Tcp
            }),
        }
    }

    /// Port for a record. The name is the hint as written, or the default
    /// protocol's name when the node has none.
    pub fn convert_port(&self, number: u16, node_meta: &HashMap<String, String>) -> Port {
        let name = self
            .protocol_hint(node_meta)
            .map(str::to_string)
            .unwrap_or_else(|| self.default_protocol.as_str().to_string());

        Port {
            name,
            number,
            protocol: self.infer_protocol(node_meta),
        }
    }

    /// Instance of `service_name`, the name the record was fetched under.
    /// The record's own `ServiceName` may be missing and is not consulted.
    pub fn convert_instance(
        &self,
        service_name: &str,
        record: &CatalogRecord,
        codec: &HostnameCodec,
    ) -> ServiceInstance {
        let port = self.convert_port(record.service_port, &record.node_meta);

        let address = if record.service_address.is_empty() {
            record.address.clone()
        } else {
            record.service_address.clone()
        };

        let service = Service {
            hostname: codec.to_hostname(service_name),
            address: non_empty(&record.service_address),
            ports: vec![port.clone()],
            external_name: record.node_meta.get(EXTERNAL_KEY).and_then(|v| non_empty(v)),
        };

        ServiceInstance {
            service,
            endpoint: NetworkEndpoint {
                address,
                port: record.service_port,
                service_port: port,
            },
            labels: self.parse_tags(&record.service_tags),
            availability_zone: non_empty(&record.datacenter),
        }
    }

    /// Aggregate the records of one service. Returns `None` when there are
    /// no records.
    pub fn convert_service(
        &self,
        service_name: &str,
        records: &[CatalogRecord],
        codec: &HostnameCodec,
    ) -> Option<Service> {
        if records.is_empty() {
            return None;
        }
        let mut service = Service::new(codec.to_hostname(service_name));

        for record in records {
            let port = self.convert_port(record.service_port, &record.node_meta);
            match service.ports.iter().find(|p| p.number == port.number) {
                Some(existing) if existing.protocol != port.protocol => {
                    tracing::warn!(
                        "Service {} has instances on port {} with different protocols ({}, {}), keeping {}",
                        service_name,
                        port.number,
                        existing.protocol,
                        port.protocol,
                        existing.protocol
                    );
                }
                Some(_) => {}
                None => service.ports.push(port),
            }

            if service.external_name.is_none() {
                service.external_name = record.node_meta.get(EXTERNAL_KEY).and_then(|v| non_empty(v));
            }
        }

        service.ports.sort_by_key(|p| p.number);
        Some(service)
    }
}

impl Default for TagTranslator {
    fn default() -> Self {
        Self::new(DEFAULT_PROTOCOL_KEY, Protocol::Http)
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

use serde::Serialize;
use sha2::{Sha256, Digest};
use mesh_model::{Labels, Port, ServiceInstance};

/// Fields that identify an instance for change detection. The availability
/// zone and the service address are derived from the same record and left out.
#[derive(Serialize)]
struct HashView<'a> {
    hostname: &'a str,
    address: &'a str,
    port: u16,
    service_port: &'a Port,
    labels: Vec<(&'a str, &'a str)>,
}

impl<'a> HashView<'a> {
    fn new(inst: &'a ServiceInstance) -> Self {
        Self {
            hostname: &inst.service.hostname,
            address: &inst.endpoint.address,
            port: inst.endpoint.port,
            service_port: &inst.endpoint.service_port,
            labels: sorted_labels(&inst.labels),
        }
    }

    fn sort_key(&self) -> (&'a str, &'a str, u16, &'a str, &[(&'a str, &'a str)]) {
        (self.hostname, self.address, self.port, &self.service_port.name, &self.labels)
    }
}

fn sorted_labels(labels: &Labels) -> Vec<(&str, &str)> {
    let mut pairs: Vec<(&str, &str)> = labels.iter().collect();
    pairs.sort_unstable();
    pairs
}

/// SHA-256 over the instance set, independent of the order the registry
/// returned records in.
pub fn compute_hash(instances: &[ServiceInstance]) -> String {
    let mut views: Vec<HashView<'_>> = instances.iter().map(HashView::new).collect();
    views.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    let json = serde_json::to_string(&views)
        .expect("Failed to serialize instances for hashing");

    let hash = Sha256::digest(json.as_bytes());
    hex::encode(hash)
}

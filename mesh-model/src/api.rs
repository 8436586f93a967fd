use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use crate::labels::LabelsCollection;

/// API path prefix
pub const API_PREFIX: &str = "/v1";

/// Body of `POST /v1/instances`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstancesRequest {
    pub hostname: String,

    /// Port names to keep; empty keeps all
    #[serde(default)]
    pub ports: Vec<String>,

    /// Label selectors to match; empty matches all
    #[serde(default)]
    pub labels: LabelsCollection,
}

/// Body of `POST /v1/host-instances`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostInstancesRequest {
    pub addresses: Vec<String>,
}

impl HostInstancesRequest {
    /// Address set in the form the controller expects.
    pub fn address_set(&self) -> HashMap<String, bool> {
        self.addresses.iter().map(|a| (a.clone(), true)).collect()
    }
}

/// Body of `GET /v1/config`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub domain: String,
    pub datacenter: String,
}

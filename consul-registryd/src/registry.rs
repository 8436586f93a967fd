use std::collections::HashMap;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use crate::error::RegistryError;

/// One node/service/tag combination as reported by the catalog.
///
/// Field names follow the Consul catalog API; absent fields take their
/// defaults so partial records still translate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CatalogRecord {
    #[serde(rename = "ID")]
    pub id: String,

    /// Node name
    pub node: String,

    /// Node address, used when the service has no address of its own
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,

    pub datacenter: String,

    #[serde(deserialize_with = "null_as_default")]
    pub node_meta: HashMap<String, String>,

    #[serde(rename = "ServiceID")]
    pub service_id: String,

    pub service_name: String,

    #[serde(deserialize_with = "null_as_default")]
    pub service_address: String,

    #[serde(deserialize_with = "null_as_default")]
    pub service_tags: Vec<String>,

    /// 0 when the registry sent no usable port
    #[serde(deserialize_with = "lenient_port")]
    pub service_port: u16,
}

/// Consul encodes empty maps and lists as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept null, negative, fractional or out-of-range ports as 0 so one bad
/// record does not fail the whole response.
fn lenient_port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let port = value
        .as_ref()
        .and_then(serde_json::Value::as_u64)
        .and_then(|n| u16::try_from(n).ok());

    Ok(port.unwrap_or_else(|| {
        tracing::debug!("ServicePort {:?} is not a valid port, using 0", value);
        0
    }))
}

/// Read-only query surface of a service registry.
///
/// Implementations own transport concerns: timeouts, retries, and
/// authentication. Any error is treated by callers as "registry unavailable".
#[async_trait]
pub trait Registry: Send + Sync + std::fmt::Debug {
    /// Every service name the registry knows, with its top-level tags.
    async fn list_service_names(&self) -> Result<HashMap<String, Vec<String>>, RegistryError>;

    /// Catalog records for one service. Unknown names yield an empty list.
    async fn list_instances(&self, service_name: &str) -> Result<Vec<CatalogRecord>, RegistryError>;

    /// Datacenter queried by this client; empty means the agent's default.
    fn datacenter(&self) -> &str {
        ""
    }
}
